//! Retry and backoff policy.
//!
//! This module holds error classification (timeouts, non-retryable markers),
//! the delay strategies and the attempt loop so every caller shares one
//! consistent retry behaviour.

mod backoff;
mod classify;
mod error;
mod policy;
mod run;

pub use backoff::{
    delay_fn, Backoff, DelayFn, DelayStrategy, ExponentialJitter, FixedDelay, LinearDelay,
};
pub use classify::{classify, is_retryable, ErrorKind};
pub use error::{non_retryable, timed_out, BoxError, ConfigError, NonRetryable, RetryError, TimedOut};
pub use policy::{
    RetryPolicy, RetryPolicyBuilder, DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY,
};
