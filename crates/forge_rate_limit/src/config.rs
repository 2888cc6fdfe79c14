//! Rate limit configuration.

use forge_error::{RateLimitError, RateLimitErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed-window admission policy.
///
/// ```toml
/// [rate_limit]
/// window_secs = 60
/// max_requests = 60
/// sweep_interval_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds
    window_secs: u64,
    /// Admissions allowed per window per client
    max_requests: u32,
    /// How often stale windows are reclaimed
    sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 60,
            sweep_interval_secs: 300,
        }
    }
}

impl RateLimitConfig {
    /// Creates a policy with the default sweep interval.
    pub fn new(window_secs: u64, max_requests: u32) -> Self {
        Self {
            window_secs,
            max_requests,
            ..Self::default()
        }
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Sweep interval.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Rejects policies that would deny or admit everything.
    ///
    /// # Errors
    ///
    /// Returns an error when the window or the cap is zero.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.window_secs == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::ZeroWindow));
        }
        if self.max_requests == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::ZeroCapacity));
        }
        Ok(())
    }
}
