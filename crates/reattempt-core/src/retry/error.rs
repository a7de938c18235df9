//! Error types produced by the retry executor and the classification markers.

use crate::control::Cancelled;

/// Boxed error returned by a retried operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Marks an error as terminal: the executor stops without spending the
/// remaining attempts. The wrapped error stays reachable through `source()`.
#[derive(Debug, thiserror::Error)]
#[error("non-retryable error: {0}")]
pub struct NonRetryable(#[source] pub BoxError);

/// Marks an error as a timeout. Timeouts are always retried, even when a
/// [`NonRetryable`] marker sits elsewhere in the same chain.
#[derive(Debug, thiserror::Error)]
#[error("timed out: {0}")]
pub struct TimedOut(#[source] pub BoxError);

/// Wrap `err` so the classifier treats it as non-retryable.
pub fn non_retryable<E>(err: E) -> BoxError
where
    E: Into<BoxError>,
{
    Box::new(NonRetryable(err.into()))
}

/// Wrap `err` so the classifier treats it as a (retryable) timeout.
pub fn timed_out<E>(err: E) -> BoxError
where
    E: Into<BoxError>,
{
    Box::new(TimedOut(err.into()))
}

/// Terminal failure of [`RetryPolicy::run`](super::RetryPolicy::run).
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The cancel token was set before an attempt started.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    /// The operation failed with an error the classifier rejected.
    #[error("non-retryable error: {source}")]
    NonRetryable { attempt: u32, source: BoxError },
    /// Every attempt failed; only the last error is kept.
    #[error("all attempts failed, the last error: {source}")]
    Exhausted { attempts: u32, source: BoxError },
}

impl RetryError {
    /// True when the run stopped because of cancellation or a deadline.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled(_))
    }

    /// Attempt on which the run stopped (`None` for cancellation).
    pub fn attempt(&self) -> Option<u32> {
        match self {
            RetryError::Cancelled(_) => None,
            RetryError::NonRetryable { attempt, .. } => Some(*attempt),
            RetryError::Exhausted { attempts, .. } => Some(*attempts),
        }
    }

    /// Consume the error and return the operation's underlying failure.
    pub fn into_source(self) -> BoxError {
        match self {
            RetryError::Cancelled(c) => Box::new(c),
            RetryError::NonRetryable { source, .. } | RetryError::Exhausted { source, .. } => source,
        }
    }
}

/// Invalid retry configuration rejected by the builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max attempts must be at least 1")]
    ZeroAttempts,
    #[error("max delay {max:?} is below base delay {base:?}")]
    MaxDelayBelowBase {
        base: std::time::Duration,
        max: std::time::Duration,
    },
}
