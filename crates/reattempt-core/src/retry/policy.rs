use super::backoff::{DelayStrategy, FixedDelay};
use super::error::ConfigError;
use crate::logging::{Logger, NopLogger};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(1);

/// Immutable retry configuration.
///
/// Holds no per-run state, so one policy can drive any number of concurrent
/// runs. Cloning is cheap: the strategy and the sink are shared.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub(super) max_attempts: u32,
    pub(super) base_delay: Duration,
    pub(super) max_delay: Duration,
    pub(super) strategy: Arc<dyn DelayStrategy>,
    pub(super) logger: Arc<dyn Logger>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            strategy: Arc::new(FixedDelay),
            logger: Arc::new(NopLogger),
        }
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Maximum number of attempts (including the first).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay the executor would wait after `attempt` (1-based) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.strategy.delay(attempt, self.base_delay, self.max_delay)
    }
}

/// Builder for [`RetryPolicy`]; unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Total number of attempts, including the first.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    /// Base delay fed to the delay strategy.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy.base_delay = delay;
        self
    }

    /// Upper bound fed to the delay strategy.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.policy.max_delay = max_delay;
        self
    }

    pub fn delay_strategy<S>(mut self, strategy: S) -> Self
    where
        S: DelayStrategy + 'static,
    {
        self.policy.strategy = Arc::new(strategy);
        self
    }

    /// Like [`delay_strategy`](Self::delay_strategy), for an already shared strategy.
    pub fn shared_delay_strategy(mut self, strategy: Arc<dyn DelayStrategy>) -> Self {
        self.policy.strategy = strategy;
        self
    }

    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.policy.logger = Arc::new(logger);
        self
    }

    pub fn shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.policy.logger = logger;
        self
    }

    pub fn build(self) -> Result<RetryPolicy, ConfigError> {
        let p = self.policy;
        if p.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if p.max_delay < p.base_delay {
            return Err(ConfigError::MaxDelayBelowBase {
                base: p.base_delay,
                max: p.max_delay,
            });
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::backoff::{delay_fn, ExponentialJitter};

    #[test]
    fn defaults() {
        let p = RetryPolicy::builder().build().unwrap();
        assert_eq!(p.max_attempts(), 3);
        assert_eq!(p.base_delay(), Duration::from_millis(100));
        assert_eq!(p.max_delay(), Duration::from_secs(1));
        assert_eq!(p.delay_for(7), Duration::from_millis(100));
    }

    #[test]
    fn builder_sets_fields() {
        let p = RetryPolicy::builder()
            .attempts(5)
            .delay(Duration::from_secs(11))
            .max_delay(Duration::from_secs(20))
            .build()
            .unwrap();
        assert_eq!(p.max_attempts(), 5);
        assert_eq!(p.base_delay(), Duration::from_secs(11));
        assert_eq!(p.max_delay(), Duration::from_secs(20));
    }

    #[test]
    fn custom_strategy_is_used() {
        let p = RetryPolicy::builder()
            .delay_strategy(delay_fn(|_, _, _| Duration::from_nanos(123)))
            .build()
            .unwrap();
        assert_eq!(p.delay_for(1), Duration::from_nanos(123));

        let p = RetryPolicy::builder()
            .delay_strategy(ExponentialJitter)
            .max_delay(Duration::from_millis(150))
            .build()
            .unwrap();
        assert_eq!(p.delay_for(1), Duration::from_millis(150));
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = RetryPolicy::builder().attempts(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroAttempts);
    }

    #[test]
    fn rejects_max_below_base() {
        let err = RetryPolicy::builder()
            .delay(Duration::from_secs(2))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MaxDelayBelowBase { .. }));
    }
}
