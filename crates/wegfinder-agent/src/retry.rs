//! Bounded retry with exponential backoff and a per-call timeout.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use wegfinder_core::AdvisoryError;

use crate::error::{NavigatorError, Operation, Result};

const MAX_BACKOFF_DOUBLINGS: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Never below 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, call_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            call_timeout,
        }
    }

    /// Delay before attempt `attempt + 1`, for `attempt >= 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
        self.base_delay.saturating_mul(1 << doublings)
    }

    pub(crate) async fn call<F, Fut>(&self, operation: Operation, mut call: F) -> Result<String>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<String, AdvisoryError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(self.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(AdvisoryError::Timeout(self.call_timeout)),
            };
            match outcome {
                Ok(text) => return Ok(text),
                Err(err) if attempt < attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        %operation,
                        attempt,
                        ?delay,
                        error = %err,
                        "advisory call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(NavigatorError::AdvisoryExhausted {
                        operation,
                        attempts: attempt,
                        source: err,
                    })
                }
            }
        }
    }
}
