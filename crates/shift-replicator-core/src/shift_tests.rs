//! Tests for the shift identifier codec.

use super::*;

// ============================================================================
// Shift Key Parsing
// ============================================================================

#[test]
fn test_parse_well_formed_key() {
    let key = ShiftKey::parse("2025-08-12-evento-diurno");

    assert_eq!(key.date_iso(), "2025-08-12");
    assert_eq!(key.date_formatted(), "12/08/2025");
    assert_eq!(key.stage(), ShiftStage::Evento);
    assert_eq!(key.period(), ShiftPeriod::Diurno);
    assert_eq!(key.as_str(), "2025-08-12-evento-diurno");
}

#[test]
fn test_parse_setup_night_key() {
    let key = ShiftKey::parse("2025-08-10-montagem-noturno");

    assert_eq!(key.stage(), ShiftStage::Montagem);
    assert_eq!(key.period(), ShiftPeriod::Noturno);
    assert_eq!(key.date_iso(), "2025-08-10");
}

#[test]
fn test_parse_short_key_defaults_stage_and_period() {
    let key = ShiftKey::parse("2025-08-12");

    assert_eq!(key.date_iso(), "2025-08-12");
    assert_eq!(key.stage(), ShiftStage::Evento);
    assert_eq!(key.period(), ShiftPeriod::Diurno);
}

#[test]
fn test_parse_unknown_stage_falls_back_to_defaults() {
    let key = ShiftKey::parse("2025-08-12-backstage-madrugada");

    assert_eq!(key.date_iso(), "2025-08-12");
    assert_eq!(key.stage(), ShiftStage::Evento);
    assert_eq!(key.period(), ShiftPeriod::Diurno);
    // The raw form is preserved even when parts are unrecognized.
    assert_eq!(key.as_str(), "2025-08-12-backstage-madrugada");
}

#[test]
fn test_parse_garbage_passes_through() {
    let key = ShiftKey::parse("not a date");

    assert_eq!(key.date_iso(), "not a date");
    assert_eq!(key.date_formatted(), "not a date");
}

#[test]
fn test_keys_equal_iff_raw_strings_equal() {
    let a = ShiftKey::parse("2025-08-12-evento-diurno");
    let b = ShiftKey::parse("2025-08-12-evento-diurno");
    let c = ShiftKey::parse("2025-08-12-evento-noturno");

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_compose_round_trips() {
    let key = ShiftKey::compose("12/08/2025", ShiftStage::Desmontagem, ShiftPeriod::Noturno);

    assert_eq!(key.as_str(), "2025-08-12-desmontagem-noturno");
    assert_eq!(key, ShiftKey::parse("2025-08-12-desmontagem-noturno"));
}

#[test]
fn test_describe_names_date_stage_period() {
    let key = ShiftKey::parse("2025-08-12-evento-noturno");
    assert_eq!(key.describe(), "12/08/2025 (evento / noturno)");
}

// ============================================================================
// Date Normalization
// ============================================================================

#[test]
fn test_format_date_iso_accepts_common_layouts() {
    assert_eq!(format_date_iso("2025-08-12"), "2025-08-12");
    assert_eq!(format_date_iso("12-08-2025"), "2025-08-12");
    assert_eq!(format_date_iso("12/08/2025"), "2025-08-12");
    assert_eq!(format_date_iso("2025/08/12"), "2025-08-12");
}

#[test]
fn test_format_date_iso_accepts_shift_key() {
    assert_eq!(
        format_date_iso("2025-08-12-evento-diurno"),
        "2025-08-12"
    );
}

#[test]
fn test_format_date_iso_accepts_rfc3339() {
    assert_eq!(
        format_date_iso("2025-08-12T14:30:00-03:00"),
        "2025-08-12"
    );
}

#[test]
fn test_format_date_iso_passes_unparseable_input_through() {
    assert_eq!(format_date_iso("tomorrow"), "tomorrow");
    assert_eq!(format_date_iso(""), "");
}

// ============================================================================
// Stage / Period Terms
// ============================================================================

#[test]
fn test_stage_round_trips_through_from_str() {
    for stage in [
        ShiftStage::Montagem,
        ShiftStage::Evento,
        ShiftStage::Desmontagem,
    ] {
        assert_eq!(stage.as_str().parse::<ShiftStage>().unwrap(), stage);
    }
}

#[test]
fn test_period_parse_is_case_insensitive() {
    assert_eq!("NOTURNO".parse::<ShiftPeriod>().unwrap(), ShiftPeriod::Noturno);
}

#[test]
fn test_unknown_term_is_reported() {
    let err = "tarde".parse::<ShiftPeriod>().unwrap_err();
    assert_eq!(err.term, "tarde");
}
