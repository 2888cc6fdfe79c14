//! Fixed-window admission limiter.

use crate::{Clock, RateLimitConfig, SystemClock};
use dashmap::DashMap;
use forge_error::RateLimitError;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// Decides whether a request from a client may proceed.
pub trait Admission: Send + Sync {
    /// Returns true when the request is admitted. Must be atomic per client.
    fn admit(&self, client_key: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    count: u32,
}

impl Window {
    fn opened_at(now: Instant) -> Self {
        Self { start: now, count: 0 }
    }

    fn expired(&self, now: Instant, length: Duration) -> bool {
        now.saturating_duration_since(self.start) >= length
    }

    /// Records one attempt and reports whether it fits under the cap.
    fn record(&mut self, now: Instant, length: Duration, cap: u32) -> bool {
        if self.expired(now, length) {
            self.start = now;
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);
        self.count <= cap
    }
}

/// Per-client fixed-window counter.
///
/// Each client key maps to `(window_start, count)`. The read-modify-write for a
/// key happens while holding that key's map shard, so concurrent requests from
/// one client never both observe the same count.
#[derive(Debug)]
pub struct FixedWindowLimiter<C: Clock = SystemClock> {
    windows: DashMap<String, Window>,
    window: Duration,
    max_requests: u32,
    clock: C,
}

impl FixedWindowLimiter<SystemClock> {
    /// Creates a limiter on the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has a zero window or cap.
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FixedWindowLimiter<C> {
    /// Creates a limiter driven by the given clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has a zero window or cap.
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Result<Self, RateLimitError> {
        config.validate()?;
        Ok(Self {
            windows: DashMap::new(),
            window: config.window(),
            max_requests: *config.max_requests(),
            clock,
        })
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Admissions left for a client in its current window.
    pub fn remaining(&self, client_key: &str) -> u32 {
        let now = self.clock.now();
        match self.windows.get(client_key) {
            Some(window) if !window.expired(now, self.window) => {
                self.max_requests.saturating_sub(window.count)
            }
            _ => self.max_requests,
        }
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    ///
    /// Admission decisions are unaffected: an expired window resets on the
    /// next attempt whether or not it has been swept.
    #[instrument(level = "debug", skip(self))]
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows
            .retain(|_, window| !window.expired(now, self.window));
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, remaining = self.windows.len(), "Swept idle rate limit windows");
        }
        removed
    }

    /// Spawns a background task that sweeps on an interval.
    ///
    /// The task holds only a weak reference and exits once the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(limiter) => {
                        limiter.sweep();
                    }
                    None => break,
                }
            }
        })
    }
}

impl<C: Clock> Admission for FixedWindowLimiter<C> {
    fn admit(&self, client_key: &str) -> bool {
        let now = self.clock.now();

        let existing = self
            .windows
            .get_mut(client_key)
            .map(|mut window| window.record(now, self.window, self.max_requests));
        let admitted = existing.unwrap_or_else(|| {
            self.windows
                .entry(client_key.to_owned())
                .or_insert_with(|| Window::opened_at(now))
                .record(now, self.window, self.max_requests)
        });
        if !admitted {
            debug!(client = client_key, "Rate limit exceeded");
        }
        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use tracing_test::traced_test;

    #[test]
    fn window_resets_exactly_at_boundary() {
        let clock = ManualClock::new();
        let limiter =
            FixedWindowLimiter::with_clock(RateLimitConfig::new(10, 1), clock.clone()).unwrap();

        assert!(limiter.admit("a"));
        clock.advance(Duration::from_millis(9_999));
        assert!(!limiter.admit("a"));
        clock.advance(Duration::from_millis(1));
        assert!(limiter.admit("a"));
    }

    #[test]
    #[traced_test]
    fn denial_of_a_known_client_is_logged() {
        let clock = ManualClock::new();
        let limiter =
            FixedWindowLimiter::with_clock(RateLimitConfig::new(60, 1), clock.clone()).unwrap();

        assert!(limiter.admit("10.0.0.7"));
        assert!(!logs_contain("Rate limit exceeded"));
        assert!(!limiter.admit("10.0.0.7"));
        assert!(logs_contain("Rate limit exceeded"));
    }

    #[test]
    fn remaining_counts_down() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::new(60, 3)).unwrap();
        assert_eq!(limiter.remaining("a"), 3);
        limiter.admit("a");
        assert_eq!(limiter.remaining("a"), 2);
    }
}
