//! Retry loop: run an operation until success, cancellation, a non-retryable
//! error, or the attempt budget runs out.

use super::classify::is_retryable;
use super::error::{BoxError, RetryError};
use super::policy::RetryPolicy;
use crate::control::CancelToken;
use std::future::Future;
use std::time::Duration;

/// What to do after a failed attempt.
enum Step {
    Stop(RetryError),
    Sleep(Duration),
}

impl RetryPolicy {
    /// Runs `op` until it succeeds or the policy says to stop.
    ///
    /// The token is polled before every attempt, including the first. On a
    /// retryable failure with attempts left, the calling thread sleeps for
    /// the strategy's delay.
    pub fn run<R, F>(&self, cancel: &CancelToken, mut op: F) -> Result<R, RetryError>
    where
        F: FnMut() -> Result<R, BoxError>,
    {
        let mut attempt = 1u32;
        loop {
            self.poll_cancel(cancel, attempt)?;
            match op() {
                Ok(resource) => return Ok(resource),
                Err(e) => match self.after_failure(attempt, e) {
                    Step::Stop(err) => return Err(err),
                    Step::Sleep(d) => std::thread::sleep(d),
                },
            }
            attempt += 1;
        }
    }

    /// Async form of [`run`](Self::run): same ordering, suspends with
    /// `tokio::time::sleep` between attempts.
    pub async fn run_async<R, F, Fut>(&self, cancel: &CancelToken, mut op: F) -> Result<R, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, BoxError>>,
    {
        let mut attempt = 1u32;
        loop {
            self.poll_cancel(cancel, attempt)?;
            match op().await {
                Ok(resource) => return Ok(resource),
                Err(e) => match self.after_failure(attempt, e) {
                    Step::Stop(err) => return Err(err),
                    Step::Sleep(d) => tokio::time::sleep(d).await,
                },
            }
            attempt += 1;
        }
    }

    fn poll_cancel(&self, cancel: &CancelToken, attempt: u32) -> Result<(), RetryError> {
        cancel.check().map_err(|cause| {
            self.logger.log(format_args!(
                "Retry cancelled by context on attempt {attempt}: {cause}"
            ));
            tracing::debug!(attempt, %cause, "retry cancelled");
            RetryError::Cancelled(cause)
        })
    }

    fn after_failure(&self, attempt: u32, err: BoxError) -> Step {
        if !is_retryable(&*err) {
            self.logger
                .log(format_args!("Non-retryable error on attempt {attempt}: {err}"));
            tracing::debug!(attempt, error = %err, "non-retryable failure");
            return Step::Stop(RetryError::NonRetryable {
                attempt,
                source: err,
            });
        }

        if attempt >= self.max_attempts {
            self.logger.log(format_args!(
                "All {} attempts failed. Last error: {err}",
                self.max_attempts
            ));
            tracing::debug!(attempts = self.max_attempts, error = %err, "retries exhausted");
            return Step::Stop(RetryError::Exhausted {
                attempts: self.max_attempts,
                source: err,
            });
        }

        let delay = self.delay_for(attempt);
        self.logger.log(format_args!(
            "Attempt {attempt} failed: {err}. Retrying in {delay:?}..."
        ));
        tracing::trace!(attempt, ?delay, error = %err, "retrying");
        Step::Sleep(delay)
    }
}
