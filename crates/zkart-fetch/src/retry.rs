use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::Retryable;

/// Exponent cap for [`retry_delay`]; doubling is preserved well past the
/// default five retries.
const MAX_EXPONENT: u32 = 16;

/// Calculate the delay before a retry attempt using exponential backoff.
///
/// The delay formula is: `base * 2^retry_count`
///
/// # Arguments
///
/// * `retry_count` - The current retry number (0-indexed: 0 = first retry)
/// * `base` - The base delay duration
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zkart_fetch::retry_delay;
///
/// // First retry: base * 2^0 = base
/// assert_eq!(retry_delay(0, Duration::from_millis(100)), Duration::from_millis(100));
///
/// // Third retry: base * 2^2 = base * 4
/// assert_eq!(retry_delay(2, Duration::from_millis(100)), Duration::from_millis(400));
/// ```
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(retry_count.min(MAX_EXPONENT));
    base.saturating_mul(multiplier)
}

/// Backoff configuration for transient fetch failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = 1 + `max_retries`.
    ///
    /// Default: 5
    pub max_retries: u32,

    /// Delay before the first retry; doubled for every subsequent one.
    ///
    /// Default: 1000ms
    pub base_delay: Duration,

    /// Add a uniform random `[0, base_delay)` to every delay.
    ///
    /// Default: true
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay:  Duration::from_millis(1000),
            jitter:      true,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 { self.max_retries.saturating_add(1) }

    /// Delay before retry `retry` (0-indexed), jitter included.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = retry_delay(retry, self.base_delay);
        if !self.jitter || self.base_delay.is_zero() {
            return delay;
        }
        let bound = u64::try_from(self.base_delay.as_nanos()).unwrap_or(u64::MAX);
        let jitter = rand::thread_rng().gen_range(0..bound);
        delay.saturating_add(Duration::from_nanos(jitter))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: E },

    #[error("non-retryable failure on attempt {attempts}: {source}")]
    Terminal { attempts: u32, source: E },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Terminal { attempts, .. }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }

    /// The last underlying error, if an attempt produced one.
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Terminal { source, .. } => Some(source),
            RetryError::Cancelled { .. } => None,
        }
    }
}

/// Run `op` until it succeeds, fails terminally, exhausts `policy` or
/// `cancel` fires.
///
/// `op` receives the 0-indexed attempt number. Both the attempt and the
/// backoff sleep race against `cancel`.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;
    loop {
        let attempt = attempts;
        attempts += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
            result = op(attempt) => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(RetryError::Terminal { attempts, source: err }),
            Err(err) if attempt >= policy.max_retries => {
                return Err(RetryError::Exhausted { attempts, source: err });
            }
            Err(err) => err,
        };

        let delay = policy.delay_for(attempt);
        warn!(
            attempt = attempts,
            max_attempts = policy.max_attempts(),
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient failure, backing off"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_basic() {
        let base = Duration::from_millis(100);

        assert_eq!(retry_delay(0, base), Duration::from_millis(100));
        assert_eq!(retry_delay(1, base), Duration::from_millis(200));
        assert_eq!(retry_delay(2, base), Duration::from_millis(400));
        assert_eq!(retry_delay(3, base), Duration::from_millis(800));
    }

    #[test]
    fn test_retry_delay_zero_base() {
        let base = Duration::from_millis(0);

        assert_eq!(retry_delay(0, base), Duration::ZERO);
        assert_eq!(retry_delay(10, base), Duration::ZERO);
    }

    #[test]
    fn test_retry_delay_exponential_growth() {
        let base = Duration::from_millis(10);
        let delays: Vec<Duration> = (0..=MAX_EXPONENT).map(|i| retry_delay(i, base)).collect();

        for i in 1..delays.len() {
            assert_eq!(delays[i], delays[i - 1] * 2);
        }
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let base = Duration::from_millis(1);
        assert_eq!(retry_delay(MAX_EXPONENT + 10, base), retry_delay(MAX_EXPONENT, base));
    }

    #[test]
    fn test_retry_delay_overflow_protection() {
        let base = Duration::from_secs(u64::MAX / 2);
        assert_eq!(retry_delay(4, base), Duration::MAX);
    }

    #[test]
    fn test_jitter_stays_below_one_base() {
        let policy = RetryPolicy::default().base_delay(Duration::from_millis(50));
        for retry in 0..5 {
            let floor = retry_delay(retry, policy.base_delay);
            for _ in 0..50 {
                let delay = policy.delay_for(retry);
                assert!(delay >= floor);
                assert!(delay < floor + policy.base_delay);
            }
        }
    }

    #[test]
    fn test_no_jitter_is_exact() {
        let policy = RetryPolicy::default()
            .base_delay(Duration::from_millis(50))
            .jitter(false);
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert!(policy.jitter);
    }
}
