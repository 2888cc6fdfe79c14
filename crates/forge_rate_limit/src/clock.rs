//! Time sources for window accounting.

use std::time::Instant;

/// Monotonic time source.
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for deterministic window tests.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: std::sync::Arc<parking_lot::Mutex<std::time::Duration>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: std::sync::Arc::new(parking_lot::Mutex::new(std::time::Duration::ZERO)),
        }
    }

    /// Moves time forward. Clones share the same timeline.
    pub fn advance(&self, by: std::time::Duration) {
        *self.offset.lock() += by;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}
