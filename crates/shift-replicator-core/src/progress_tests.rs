//! Tests for progress snapshots and duration formatting.

use super::*;

// ============================================================================
// Duration Formatting
// ============================================================================

#[test]
fn test_format_duration_seconds() {
    assert_eq!(format_duration(Duration::from_secs(0)), "0s");
    assert_eq!(format_duration(Duration::from_secs(45)), "45s");
    assert_eq!(format_duration(Duration::from_millis(59_999)), "59s");
}

#[test]
fn test_format_duration_minutes() {
    assert_eq!(format_duration(Duration::from_secs(60)), "1m 00s");
    assert_eq!(format_duration(Duration::from_secs(200)), "3m 20s");
    assert_eq!(format_duration(Duration::from_secs(3599)), "59m 59s");
}

#[test]
fn test_format_duration_hours() {
    assert_eq!(format_duration(Duration::from_secs(3600)), "1h 00m");
    assert_eq!(format_duration(Duration::from_secs(3900)), "1h 05m");
    assert_eq!(format_duration(Duration::from_secs(7500)), "2h 05m");
}

// ============================================================================
// Progress Snapshot
// ============================================================================

#[test]
fn test_new_progress_starts_empty() {
    let progress = ReplicationProgress::new(12, 2);
    assert_eq!(progress.total, 12);
    assert_eq!(progress.current, 0);
    assert_eq!(progress.processed, 0);
    assert_eq!(progress.total_batches, 2);
    assert!(progress.estimated_time_remaining.is_none());
    assert_eq!(progress.completion(), 0.0);
}

#[test]
fn test_advance_derives_eta_from_average() {
    let mut progress = ReplicationProgress::new(10, 1);

    // First operation: nothing processed yet, no ETA.
    progress.advance(Duration::ZERO);
    assert!(progress.estimated_time_remaining.is_none());

    // Five done in ten seconds: two seconds each, five remaining.
    progress.processed = 5;
    progress.advance(Duration::from_secs(10));
    assert_eq!(
        progress.estimated_time_remaining,
        Some(Duration::from_secs(10))
    );
    assert!((progress.operations_per_minute - 30.0).abs() < 1e-9);
}

#[test]
fn test_completion_ratio() {
    let mut progress = ReplicationProgress::new(4, 1);
    progress.processed = 1;
    assert_eq!(progress.completion(), 0.25);

    let empty = ReplicationProgress::new(0, 0);
    assert_eq!(empty.completion(), 0.0);
}

#[test]
fn test_phase_numbers_follow_execution_order() {
    assert_eq!(ReplicationPhase::Companies.number(), 1);
    assert_eq!(ReplicationPhase::Credentials.number(), 2);
    assert_eq!(ReplicationPhase::Participants.number(), 3);
    assert_eq!(ReplicationPhase::Participants.label(), "participants");
}
