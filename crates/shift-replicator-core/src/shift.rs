//! Shift identifier codec.
//!
//! A shift key is the composite string `YYYY-MM-DD-<stage>-<period>` used by
//! the staffing API to tag records with one work period of an event. The
//! codec is deliberately lossy-tolerant: every input yields a best-effort
//! [`ShiftKey`], malformed input degrades to pass-through instead of failing.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Stage and Period
// ============================================================================

/// Stage of the event a shift belongs to.
///
/// Wire form is the Portuguese term used by the staffing API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStage {
    /// Setup phase, before the event opens
    Montagem,

    /// The event itself
    #[default]
    Evento,

    /// Teardown phase, after the event closes
    Desmontagem,
}

impl ShiftStage {
    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStage::Montagem => "montagem",
            ShiftStage::Evento => "evento",
            ShiftStage::Desmontagem => "desmontagem",
        }
    }
}

impl fmt::Display for ShiftStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShiftStage {
    type Err = UnknownShiftTerm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "montagem" => Ok(ShiftStage::Montagem),
            "evento" => Ok(ShiftStage::Evento),
            "desmontagem" => Ok(ShiftStage::Desmontagem),
            _ => Err(UnknownShiftTerm {
                term: s.to_string(),
            }),
        }
    }
}

/// Day/night period of a shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftPeriod {
    /// Day shift
    #[default]
    Diurno,

    /// Night shift
    Noturno,
}

impl ShiftPeriod {
    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftPeriod::Diurno => "diurno",
            ShiftPeriod::Noturno => "noturno",
        }
    }
}

impl fmt::Display for ShiftPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShiftPeriod {
    type Err = UnknownShiftTerm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diurno" => Ok(ShiftPeriod::Diurno),
            "noturno" => Ok(ShiftPeriod::Noturno),
            _ => Err(UnknownShiftTerm {
                term: s.to_string(),
            }),
        }
    }
}

/// A stage/period word the codec does not recognize.
///
/// Only surfaced by the `FromStr` impls; [`ShiftKey::parse`] swallows it and
/// falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shift term: {term}")]
pub struct UnknownShiftTerm {
    pub term: String,
}

// ============================================================================
// Shift Key
// ============================================================================

/// Parsed form of a composite shift identifier.
///
/// Two shift keys are equal iff their string forms are equal; the derived
/// fields are deterministic functions of the raw key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftKey {
    raw: String,
    date_iso: String,
    date_formatted: String,
    stage: ShiftStage,
    period: ShiftPeriod,
}

impl ShiftKey {
    /// Parse a shift key, best effort.
    ///
    /// With five or more `-`-separated parts the first three form the ISO
    /// date and parts four and five name stage and period. Anything shorter
    /// is treated as a literal date with stage and period defaulted
    /// (`evento` / `diurno`). Unrecognized stage or period words also fall
    /// back to the defaults. Never fails.
    pub fn parse(key: &str) -> Self {
        let parts: Vec<&str> = key.split('-').collect();

        let (date_iso, stage, period) = if parts.len() >= 5 {
            (
                format!("{}-{}-{}", parts[0], parts[1], parts[2]),
                parts[3].parse().unwrap_or_default(),
                parts[4].parse().unwrap_or_default(),
            )
        } else {
            (
                format_date_iso(key),
                ShiftStage::default(),
                ShiftPeriod::default(),
            )
        };

        let date_formatted = NaiveDate::parse_from_str(&date_iso, "%Y-%m-%d")
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|_| date_iso.clone());

        Self {
            raw: key.to_string(),
            date_iso,
            date_formatted,
            stage,
            period,
        }
    }

    /// Compose a shift key from its structured parts.
    pub fn compose(date_iso: &str, stage: ShiftStage, period: ShiftPeriod) -> Self {
        let date_iso = format_date_iso(date_iso);
        Self::parse(&format!("{}-{}-{}", date_iso, stage, period))
    }

    /// The raw string form of the key
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Calendar date in `YYYY-MM-DD` form
    pub fn date_iso(&self) -> &str {
        &self.date_iso
    }

    /// Calendar date in `DD/MM/YYYY` display form
    pub fn date_formatted(&self) -> &str {
        &self.date_formatted
    }

    /// Event stage of this shift
    pub fn stage(&self) -> ShiftStage {
        self.stage
    }

    /// Day/night period of this shift
    pub fn period(&self) -> ShiftPeriod {
        self.period
    }

    /// Human-readable description used in run summaries
    pub fn describe(&self) -> String {
        format!(
            "{} ({} / {})",
            self.date_formatted, self.stage, self.period
        )
    }
}

impl PartialEq for ShiftKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ShiftKey {}

impl std::hash::Hash for ShiftKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for ShiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for ShiftKey {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}

// ============================================================================
// Date Normalization
// ============================================================================

/// Accepted calendar-date layouts, tried in order.
const DATE_LAYOUTS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Normalize a date-ish string to `YYYY-MM-DD`, best effort.
///
/// Handles ISO dates, Brazilian `DD-MM-YYYY` / `DD/MM/YYYY`, full shift keys
/// and RFC3339 timestamps. Unparseable input is returned unchanged.
pub fn format_date_iso(input: &str) -> String {
    let input = input.trim();

    // A full shift key carries its date in the first three parts.
    let parts: Vec<&str> = input.split('-').collect();
    if parts.len() >= 5 {
        let candidate = format!("{}-{}-{}", parts[0], parts[1], parts[2]);
        if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(input, layout) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }

    input.to_string()
}

#[cfg(test)]
#[path = "shift_tests.rs"]
mod tests;
