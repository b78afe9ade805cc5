//! Exponential backoff for transient upstream failures.

use crate::BackoffSettings;
use std::future::Future;
use std::time::Duration;
use tessera_error::TesseraResult;
use tokio_retry2::{Retry, RetryError, strategy::jitter};
use tracing::{debug, warn};

/// Retry budget and delay schedule for rate-limited calls.
///
/// Delays double from `initial_delay` and are capped at `max_delay`; at most
/// `max_retries` retries follow the first attempt.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tessera_rate_limit::BackoffPolicy;
///
/// let policy = BackoffPolicy::new(Duration::from_secs(1), 4, Duration::from_secs(5));
/// let delays: Vec<Duration> = policy.delays().collect();
/// assert_eq!(
///     delays,
///     vec![
///         Duration::from_secs(1),
///         Duration::from_secs(2),
///         Duration::from_secs(4),
///         Duration::from_secs(5),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    initial_delay: Duration,
    max_retries: usize,
    max_delay: Duration,
    jitter: bool,
}

impl BackoffPolicy {
    /// Policy without jitter.
    pub fn new(initial_delay: Duration, max_retries: usize, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_retries,
            max_delay,
            jitter: false,
        }
    }

    /// Randomize each delay.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Policy that retries `max_retries` times without sleeping.
    pub fn immediate(max_retries: usize) -> Self {
        Self::new(Duration::ZERO, max_retries, Duration::ZERO)
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Deterministic delay schedule, one entry per retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let initial = self.initial_delay;
        let max_delay = self.max_delay;
        (0..self.max_retries).map(move |attempt| {
            let factor = 2u32.saturating_pow(attempt.min(31) as u32);
            initial.saturating_mul(factor).min(max_delay)
        })
    }

    fn strategy(&self) -> Vec<Duration> {
        if self.jitter {
            self.delays().map(jitter).collect()
        } else {
            self.delays().collect()
        }
    }
}

impl From<&BackoffSettings> for BackoffPolicy {
    fn from(settings: &BackoffSettings) -> Self {
        Self::new(
            Duration::from_millis(*settings.initial_delay_ms()),
            *settings.max_retries(),
            Duration::from_secs(*settings.max_delay_secs()),
        )
        .with_jitter(*settings.jitter())
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&BackoffSettings::default())
    }
}

/// Run `action`, retrying retryable failures on `policy`'s schedule.
///
/// Non-retryable failures return immediately. When the budget runs out the
/// last transient error is returned. A server-provided retry-after hint
/// replaces the scheduled delay for that retry.
///
/// # Examples
///
/// ```
/// use tessera_rate_limit::{BackoffPolicy, retry_transient};
///
/// # #[tokio::main]
/// # async fn main() {
/// let value = retry_transient(&BackoffPolicy::immediate(2), "lookup", || async {
///     Ok::<_, tessera_error::TesseraError>(42)
/// })
/// .await
/// .unwrap();
/// assert_eq!(value, 42);
/// # }
/// ```
pub async fn retry_transient<T, F, Fut>(
    policy: &BackoffPolicy,
    operation: &str,
    mut action: F,
) -> TesseraResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TesseraResult<T>>,
{
    let mut attempt = 0usize;
    Retry::spawn(policy.strategy(), || {
        attempt += 1;
        let current = attempt;
        let fut = action();
        async move {
            match fut.await {
                Ok(value) => {
                    if current > 1 {
                        debug!(operation, attempt = current, "Succeeded after retry");
                    }
                    Ok(value)
                }
                Err(e) if e.is_retryable() => {
                    warn!(operation, attempt = current, error = %e, "Transient failure, will retry");
                    Err(RetryError::Transient {
                        retry_after: e.retry_after(),
                        err: e,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        }
    })
    .await
}
