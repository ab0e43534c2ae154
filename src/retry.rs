//! Bounded fixed-delay retry policy.
//!
//! Applied to the visual commit pipeline; failures are retried a fixed
//! number of times and the last error is returned once attempts are
//! exhausted.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Fixed-delay retry with a hard attempt cap
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or `max_attempts` attempts have failed,
    /// sleeping the fixed delay between attempts. Returns the last error
    /// on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(%label, attempt, max_attempts = attempts, "attempt failed: {e}");
                    if attempt >= attempts {
                        return Err(e);
                    }
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
