//! # Shift Replicator Client
//!
//! Transport and configuration layer for the shift replication engine.
//!
//! This crate owns everything that touches the outside world on behalf of
//! the core:
//! - [`HttpStaffingBackend`] implements the core's `StaffingBackend` trait
//!   over the staffing REST API, including the legacy wire field names
//! - [`ReplicatorConfig`] loads tuning from a TOML file with
//!   `SHIFT_REPLICATOR_*` environment overrides

pub mod config;
pub mod rest;

pub use config::{ApiConfig, ConfigError, LoggingConfig, RateLimitSettings, ReplicatorConfig};
pub use rest::{ClientError, HttpStaffingBackend};
