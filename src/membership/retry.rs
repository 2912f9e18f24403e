use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Fixed {
        attempts: usize,
        delay: Duration,
    },
    /// Doubles the delay after each failure up to `max`, plus up to 50ms of jitter.
    Exponential {
        attempts: usize,
        base: Duration,
        max: Duration,
    },
}

impl RetryPolicy {
    /// Startup join: 5 attempts, 2s apart.
    pub fn bootstrap() -> Self {
        RetryPolicy::Fixed {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }

    pub fn max_attempts(&self) -> usize {
        match *self {
            RetryPolicy::Fixed { attempts, .. } | RetryPolicy::Exponential { attempts, .. } => {
                attempts.max(1)
            }
        }
    }

    /// Wait before attempt `attempt + 1`, where `attempt` is the zero-based
    /// index of the attempt that just failed.
    pub fn delay_after(&self, attempt: usize) -> Duration {
        match *self {
            RetryPolicy::Fixed { delay, .. } => delay,
            RetryPolicy::Exponential { base, max, .. } => {
                let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
                let backoff = base.saturating_mul(factor).min(max);
                let jitter = rand::random::<u64>() % 50;
                backoff + Duration::from_millis(jitter)
            }
        }
    }

    /// Runs `op` until it succeeds, fails with an error that is not a peer
    /// failure, or the attempts run out. Returns the last error.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_peer_failure() => return Err(e),
                Err(e) => {
                    tracing::warn!("[{}] attempt {} failed: {}", label, attempt + 1, e);
                    if attempt + 1 >= attempts {
                        return Err(e);
                    }
                    tokio::time::sleep(self.delay_after(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
