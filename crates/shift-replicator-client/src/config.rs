//! Configuration for the replicator.
//!
//! Layered the usual way: compiled-in defaults, then an optional TOML file,
//! then `SHIFT_REPLICATOR_*` environment variables (double underscore as the
//! section separator, e.g. `SHIFT_REPLICATOR_API__BASE_URL`).

use serde::{Deserialize, Serialize};
use shift_replicator_core::rate_limiter::RateLimiterConfig;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "SHIFT_REPLICATOR";

// ============================================================================
// Sections
// ============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReplicatorConfig {
    /// Staffing API settings
    pub api: ApiConfig,

    /// Rate limiting settings
    pub rate_limit: RateLimitSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Staffing API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the staffing API, including any path prefix
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// External quota and the margin the limiter keeps under it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// External quota, operations per minute
    pub quota_per_minute: u32,

    /// Fraction of the quota the replicator is willing to use
    pub safety_factor: f64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            quota_per_minute: 100,
            safety_factor: 0.8,
        }
    }
}

impl RateLimitSettings {
    /// Translate into the core limiter tuning
    pub fn to_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            quota_per_minute: self.quota_per_minute,
            safety_factor: self.safety_factor,
            ..RateLimiterConfig::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

// ============================================================================
// Loading and Validation
// ============================================================================

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ReplicatorConfig {
    /// Load configuration from defaults, an optional file and the
    /// environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check field-level constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::Invalid {
                field: "api.base_url".to_string(),
                message: format!("not a valid URL: {}", self.api.base_url),
            });
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "api.timeout_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.rate_limit.quota_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.quota_per_minute".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(self.rate_limit.safety_factor > 0.0 && self.rate_limit.safety_factor <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "rate_limit.safety_factor".to_string(),
                message: "must be within (0, 1]".to_string(),
            });
        }
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid {
                field: "logging.level".to_string(),
                message: format!("unknown level: {}", self.logging.level),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
