//! Adaptive rate limiter for the remote staffing API.
//!
//! Tracks a sliding one-minute window of operations and computes a delay
//! before each remote call so the run stays under a safety margin of the
//! external quota. Spreads calls across the remaining window instead of
//! bursting to the cap and stalling.
//!
//! Not reentrant-safe for concurrent replications: state has exactly one
//! writer because the executor is a single cooperative task (callers must
//! serialize overlapping runs).

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// Tuning for [`AdaptiveRateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// External quota, operations per window
    pub quota_per_minute: u32,

    /// Fraction of the quota the limiter is willing to use
    pub safety_factor: f64,

    /// Rolling window length
    pub window: Duration,

    /// Floor for the per-operation delay
    pub min_delay: Duration,

    /// Ceiling for the adaptive per-operation delay
    pub max_delay: Duration,

    /// Extra pad added when sleeping out a saturated window
    pub throttle_pad: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            quota_per_minute: 100,
            safety_factor: 0.8,
            window: Duration::from_secs(60),
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
            throttle_pad: Duration::from_secs(1),
        }
    }
}

impl RateLimiterConfig {
    /// Effective cap per window: `floor(quota * safety_factor)`
    pub fn effective_cap(&self) -> u32 {
        (self.quota_per_minute as f64 * self.safety_factor).floor() as u32
    }
}

// ============================================================================
// State
// ============================================================================

/// Window bookkeeping, single writer by construction.
#[derive(Debug, Clone)]
struct WindowState {
    /// Operations attributed since `window_start`
    operations_count: u32,

    /// Start of the current window
    window_start: Instant,

    /// Whether the last computed delay hit the saturated-window branch
    is_throttled: bool,
}

/// Read-only view of limiter state, for progress reporting and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterSnapshot {
    pub operations_count: u32,
    pub is_throttled: bool,
    pub window_elapsed: Duration,
}

// ============================================================================
// Limiter
// ============================================================================

/// Self-throttling scheduler for sequential remote calls.
pub struct AdaptiveRateLimiter {
    config: RateLimiterConfig,
    state: Mutex<WindowState>,
}

impl AdaptiveRateLimiter {
    /// Create a limiter with the given tuning
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            state: Mutex::new(WindowState {
                operations_count: 0,
                window_start: Instant::now(),
                is_throttled: false,
            }),
        }
    }

    /// Limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Account for one operation and suspend until it may proceed.
    ///
    /// `operations_remaining` is the number of operations the run still has
    /// to perform (including this one); the adaptive branch spreads them over
    /// the rest of the window. Returns the delay that was slept.
    pub async fn wait_for_turn(&self, operations_remaining: usize) -> Duration {
        let delay = self.reserve(operations_remaining);
        tokio::time::sleep(delay).await;
        delay
    }

    /// Current window state
    pub fn snapshot(&self) -> RateLimiterSnapshot {
        let state = self.state.lock().unwrap();
        RateLimiterSnapshot {
            operations_count: state.operations_count,
            is_throttled: state.is_throttled,
            window_elapsed: state.window_start.elapsed(),
        }
    }

    /// Compute the delay for the next operation and update the window.
    ///
    /// Branches, in order:
    /// 1. window elapsed: reset to `{1, now, false}`, minimal delay;
    /// 2. cap reached: mark throttled, sleep out the window plus the pad;
    /// 3. otherwise: spread the remaining operations over the remaining
    ///    window, clamped to `[min_delay, max_delay]`.
    fn reserve(&self, operations_remaining: usize) -> Duration {
        let cap = self.config.effective_cap();
        let mut state = self.state.lock().unwrap();

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.window_start);

        if elapsed >= self.config.window {
            state.operations_count = 1;
            state.window_start = now;
            state.is_throttled = false;
            return self.config.min_delay;
        }

        let remaining_window = self.config.window - elapsed;

        if state.operations_count >= cap {
            state.is_throttled = true;
            let delay = remaining_window + self.config.throttle_pad;
            debug!(
                operations = state.operations_count,
                cap,
                delay_ms = delay.as_millis() as u64,
                "rate limit window saturated, sleeping it out"
            );
            return delay;
        }

        state.operations_count += 1;
        state.is_throttled = false;

        let spread = remaining_window / operations_remaining.max(1) as u32;
        spread.clamp(self.config.min_delay, self.config.max_delay)
    }
}

impl Default for AdaptiveRateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod tests;
