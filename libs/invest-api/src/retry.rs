use std::future::Future;
use std::time::Duration;

use tonic::{Code, Status};
use tracing::{debug, warn};

/// Retry policy applied uniformly to every call made through an Invest API client
///
/// `max_attempts` counts the original call, so the default policy makes at
/// most four retries. Only statuses listed in `retryable_status_codes` are
/// retried; anything else is returned after the first failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub retryable_status_codes: &'static [Code],
}

impl RetryPolicy {
    /// 5 attempts, 1s..5s backoff growing by 1.5x, retry on UNAVAILABLE only
    pub const DEFAULT: RetryPolicy = RetryPolicy {
        max_attempts: 5,
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(5),
        backoff_multiplier: 1.5,
        retryable_status_codes: &[Code::Unavailable],
    };

    pub fn is_retryable(&self, code: Code) -> bool {
        self.retryable_status_codes.contains(&code)
    }

    /// Upper bound of the delay before retry number `retry` (1-based)
    ///
    /// `initial_backoff * multiplier^(retry - 1)`, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_backoff.as_secs_f64()))
    }

    /// Run `operation` until it succeeds, fails with a non-retryable status,
    /// or `max_attempts` is reached
    ///
    /// The operation is invoked once per attempt, so it must rebuild its
    /// request every time (tonic requests are consumed by the call).
    ///
    /// # Example
    /// ```ignore
    /// let response = RetryPolicy::DEFAULT
    ///     .execute(|| {
    ///         let mut client = client.clone();
    ///         async move { client.get_accounts(GetAccountsRequest::default()).await }
    ///     })
    ///     .await?;
    /// ```
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, Status>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Status>>,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(target: "invest_api", attempt, "Call succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(status) => {
                    if !self.is_retryable(status.code()) {
                        return Err(status);
                    }

                    if attempt >= self.max_attempts {
                        warn!(
                            target: "invest_api",
                            attempts = attempt,
                            code = ?status.code(),
                            "Call failed after exhausting retry attempts"
                        );
                        return Err(status);
                    }

                    let delay = apply_jitter(self.backoff(attempt));

                    debug!(
                        target: "invest_api",
                        attempt,
                        max_attempts = self.max_attempts,
                        code = ?status.code(),
                        delay_ms = delay.as_millis() as u64,
                        "Retryable status, backing off"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Apply jitter to a delay to avoid synchronized retries across clients
///
/// Uses a random value between 50% and 100% of the original delay
fn apply_jitter(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let random_factor =
        (RandomState::new().hash_one(std::time::SystemTime::now()) % 50) as f64 / 100.0 + 0.5;

    delay.mul_f64(random_factor)
}
