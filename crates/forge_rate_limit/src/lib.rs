//! Admission control for inbound requests.
//!
//! A soft protection for downstream services: each client identity (usually
//! the source address) gets a fixed window with a cap on admissions. State is
//! process-local and lost on restart.
//!
//! ```
//! use forge_rate_limit::{Admission, FixedWindowLimiter, RateLimitConfig};
//!
//! let limiter = FixedWindowLimiter::new(RateLimitConfig::new(60, 2)).unwrap();
//! assert!(limiter.admit("203.0.113.7"));
//! assert!(limiter.admit("203.0.113.7"));
//! assert!(!limiter.admit("203.0.113.7"));
//! assert!(limiter.admit("198.51.100.1"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod limiter;

#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use config::RateLimitConfig;
pub use forge_error::{RateLimitError, RateLimitErrorKind};
pub use limiter::{Admission, FixedWindowLimiter};
