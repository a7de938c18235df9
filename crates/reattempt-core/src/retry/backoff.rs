//! Delay strategies: compute how long to wait before the next attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Computes the wait before the next attempt.
///
/// `attempt` is the attempt that just failed (the executor passes the 1-based
/// count). Implementations must be pure apart from randomness and safe to call
/// from many threads at once.
pub trait DelayStrategy: Send + Sync + fmt::Debug {
    fn delay(&self, attempt: u32, base: Duration, max: Duration) -> Duration;
}

/// Always waits `base`, whatever the attempt and `max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay;

impl DelayStrategy for FixedDelay {
    fn delay(&self, _attempt: u32, base: Duration, _max: Duration) -> Duration {
        base
    }
}

/// `base * 2^attempt` plus up to 20% random jitter, capped at `max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialJitter;

impl DelayStrategy for ExponentialJitter {
    fn delay(&self, attempt: u32, base: Duration, max: Duration) -> Duration {
        let Some(exp) = mul_pow2(base, attempt) else {
            return max;
        };
        let jitter = jitter_below(exp / 5);
        exp.saturating_add(jitter).min(max)
    }
}

/// `base * attempt`, capped at `max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDelay;

impl DelayStrategy for LinearDelay {
    fn delay(&self, attempt: u32, base: Duration, max: Duration) -> Duration {
        base.saturating_mul(attempt).min(max)
    }
}

/// `base * 2^attempt`, or `None` when the result does not fit in a `Duration`.
fn mul_pow2(base: Duration, attempt: u32) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let nanos = base.as_nanos();
    if nanos == 0 {
        return Some(Duration::ZERO);
    }
    if attempt > nanos.leading_zeros() {
        return None;
    }
    let nanos = nanos << attempt;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

/// Uniform in `[0, bound)`; zero when the range is empty.
fn jitter_below(bound: Duration) -> Duration {
    let nanos = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(fastrand::u64(..nanos))
}

/// Adapter so plain closures can be used as strategies.
pub struct DelayFn<F>(F);

impl<F> fmt::Debug for DelayFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DelayFn")
    }
}

impl<F> DelayStrategy for DelayFn<F>
where
    F: Fn(u32, Duration, Duration) -> Duration + Send + Sync,
{
    fn delay(&self, attempt: u32, base: Duration, max: Duration) -> Duration {
        (self.0)(attempt, base, max)
    }
}

/// Use a closure `(attempt, base, max) -> delay` as a strategy.
pub fn delay_fn<F>(f: F) -> DelayFn<F>
where
    F: Fn(u32, Duration, Duration) -> Duration + Send + Sync,
{
    DelayFn(f)
}

/// Named strategies, as written in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
    Linear,
}

impl Backoff {
    pub fn strategy(self) -> Arc<dyn DelayStrategy> {
        match self {
            Backoff::Fixed => Arc::new(FixedDelay),
            Backoff::Exponential => Arc::new(ExponentialJitter),
            Backoff::Linear => Arc::new(LinearDelay),
        }
    }
}

impl std::str::FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Backoff::Fixed),
            "exponential" | "exp" => Ok(Backoff::Exponential),
            "linear" => Ok(Backoff::Linear),
            other => Err(format!("unknown backoff '{other}' (expected fixed, exponential or linear)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fixed_ignores_attempt_and_max() {
        let base = 100 * MS;
        for attempt in 0..=1000 {
            assert_eq!(FixedDelay.delay(attempt, base, 1000 * MS), base);
        }
        assert_eq!(FixedDelay.delay(5, 10 * 1000 * MS, 3 * 1000 * MS), 10 * 1000 * MS);
    }

    #[test]
    fn exponential_clamps_to_max() {
        for _ in 0..1000 {
            assert_eq!(ExponentialJitter.delay(2, 100 * MS, 300 * MS), 300 * MS);
        }
    }

    #[test]
    fn exponential_jitter_stays_in_range() {
        for _ in 0..1000 {
            let d = ExponentialJitter.delay(3, 100 * MS, 1000 * MS);
            assert!(d >= 800 * MS, "{d:?} below lower bound");
            assert!(d < 960 * MS, "{d:?} above upper bound");
        }
    }

    #[test]
    fn exponential_zero_width_jitter() {
        // 4ns / 5 == 0: no jitter range at all.
        let base = Duration::from_nanos(4);
        assert_eq!(ExponentialJitter.delay(0, base, MS), base);
        assert_eq!(ExponentialJitter.delay(3, Duration::ZERO, MS), Duration::ZERO);
    }

    #[test]
    fn exponential_saturates_instead_of_wrapping() {
        let max = 30 * 1000 * MS;
        assert_eq!(ExponentialJitter.delay(31, 100 * MS, max), max);
        assert_eq!(ExponentialJitter.delay(64, 100 * MS, max), max);
        assert_eq!(ExponentialJitter.delay(u32::MAX, 100 * MS, max), max);
        assert_eq!(ExponentialJitter.delay(10, Duration::MAX, max), max);
    }

    #[test]
    fn exponential_large_attempt_without_overflow() {
        let hour = 3600 * 1000 * MS;
        for _ in 0..100 {
            let d = ExponentialJitter.delay(32, Duration::from_nanos(1), hour);
            assert!(d >= Duration::from_nanos(1 << 32), "{d:?} below 2^32ns");
            assert!(d < Duration::from_nanos((1 << 32) + (1 << 32) / 5), "{d:?} above jitter bound");
        }
        assert_eq!(ExponentialJitter.delay(40, Duration::ZERO, hour), Duration::ZERO);
        assert_eq!(ExponentialJitter.delay(u32::MAX, Duration::ZERO, hour), Duration::ZERO);
        assert_eq!(ExponentialJitter.delay(127, Duration::from_nanos(1), hour), hour);
    }

    #[test]
    fn linear_grows_and_caps() {
        assert_eq!(LinearDelay.delay(1, 100 * MS, 1000 * MS), 100 * MS);
        assert_eq!(LinearDelay.delay(4, 100 * MS, 1000 * MS), 400 * MS);
        assert_eq!(LinearDelay.delay(50, 100 * MS, 1000 * MS), 1000 * MS);
    }

    #[test]
    fn closure_strategy() {
        let s = delay_fn(|attempt, base, _| base * attempt);
        assert_eq!(s.delay(3, 10 * MS, MS), 30 * MS);
    }

    #[test]
    fn backoff_names() {
        assert_eq!("Exponential".parse::<Backoff>(), Ok(Backoff::Exponential));
        assert_eq!("linear".parse::<Backoff>(), Ok(Backoff::Linear));
        assert!("random".parse::<Backoff>().is_err());
        assert_eq!(Backoff::default(), Backoff::Fixed);
    }
}
