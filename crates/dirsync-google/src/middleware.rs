//! Retry with exponential backoff for transient API failures

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{GoogleError, Result};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (zero-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        std::cmp::min(Duration::from_millis(delay_ms as u64), self.max_delay)
    }
}

/// Re-runs an operation while it fails with a retryable error
#[derive(Debug, Clone)]
pub struct RetryMiddleware {
    config: RetryConfig,
}

impl RetryMiddleware {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. Exhaustion keeps the last error.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_if(operation, GoogleError::is_retryable).await
    }

    /// Like [`execute`](Self::execute), but only errors accepted by
    /// `retryable` are attempted again
    pub async fn execute_if<F, Fut, T, P>(&self, operation: F, retryable: P) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&GoogleError) -> bool,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if !retryable(&e) => return Err(e),
                Err(e) if attempt >= self.config.max_retries => {
                    if attempt == 0 {
                        return Err(e);
                    }
                    return Err(GoogleError::RetryLimitExceeded {
                        attempts: attempt + 1,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.config.calculate_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
