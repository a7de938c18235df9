//! Cooperative cancellation: shared cancel tokens with an optional deadline.
//!
//! The retry executor polls the token at the top of every attempt. A token
//! set while the executor sleeps between attempts takes effect at the next
//! poll, not mid-sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a token reports itself as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Cancelled {
    /// `cancel()` was called on the token or one of its clones.
    #[error("operation cancelled")]
    Cancelled,
    /// The token's deadline has passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Shared cancel flag plus an optional deadline. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that is never done until `cancel()` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also reports [`Cancelled::DeadlineExceeded`] once `deadline` passes.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Token whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// Token sharing this token's flag, with the earlier of the two deadlines.
    pub fn child_with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(own) => own.min(deadline),
            None => deadline,
        };
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(deadline),
        }
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking poll. Explicit cancellation wins over an expired deadline.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(Cancelled::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Cancelled::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }
}
