//! Classify operation errors into retry kinds by inspecting the source chain.

use super::error::{NonRetryable, TimedOut};
use std::error::Error;
use std::io;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something in the chain reported a timeout. Always retried.
    Timeout,
    /// Ordinary failure; retried while attempts remain.
    Transient,
    /// Explicitly marked with [`NonRetryable`]; never retried.
    Permanent,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::Permanent)
    }
}

/// Classify an error.
///
/// The timeout check runs over the whole chain before the marker check, so a
/// timeout wrapped in [`NonRetryable`] is still retried.
pub fn classify(err: &(dyn Error + 'static)) -> ErrorKind {
    if chain(err).any(reports_timeout) {
        return ErrorKind::Timeout;
    }
    if chain(err).any(|e| e.is::<NonRetryable>()) {
        return ErrorKind::Permanent;
    }
    ErrorKind::Transient
}

/// Shorthand for `classify(err).is_retryable()`.
pub fn is_retryable(err: &(dyn Error + 'static)) -> bool {
    classify(err).is_retryable()
}

fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

fn reports_timeout(err: &(dyn Error + 'static)) -> bool {
    if err.is::<TimedOut>() || err.is::<tokio::time::error::Elapsed>() {
        return true;
    }
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::TimedOut)
}
