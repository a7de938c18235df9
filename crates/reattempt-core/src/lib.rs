//! Retry orchestration: run a fallible, resource-producing operation up to a
//! bounded number of times with a computed delay between attempts.
//!
//! ```no_run
//! use reattempt_core::control::CancelToken;
//! use reattempt_core::retry::{non_retryable, ExponentialJitter, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::builder()
//!     .attempts(5)
//!     .delay(Duration::from_millis(200))
//!     .max_delay(Duration::from_secs(5))
//!     .delay_strategy(ExponentialJitter)
//!     .build()?;
//!
//! let file = policy.run(&CancelToken::new(), || {
//!     std::fs::File::open("/var/run/app.sock").map_err(|e| match e.kind() {
//!         std::io::ErrorKind::NotFound => non_retryable(e),
//!         _ => e.into(),
//!     })
//! })?;
//! # drop(file);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod control;
pub mod logging;
pub mod retry;
