//! Fixed-delay retry for throttled requests.

use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

use crate::providers::{ProviderError, RateLimitedSnafu};

/// Default wait before retrying a throttled request.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// Retries an operation only when the provider throttles it.
///
/// Any other error is returned immediately. Once `max_retries` is spent the
/// final throttle is reported as [`ProviderError::RateLimited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRetry {
    pub delay: Duration,
    pub max_retries: u32,
}

impl RateLimitRetry {
    pub const fn new(delay: Duration, max_retries: u32) -> Self {
        Self { delay, max_retries }
    }

    /// One retry after `delay`.
    pub const fn once_after(delay: Duration) -> Self {
        Self::new(delay, 1)
    }

    /// Runs `op`, passing the zero-based attempt number.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Err(err) if err.is_rate_limited() => {
                    if attempt >= self.max_retries {
                        return RateLimitedSnafu {
                            attempts: attempt + 1,
                        }
                        .fail();
                    }
                    warn!(
                        attempt,
                        delay_ms = self.delay.as_millis() as u64,
                        "rate limited by provider, retrying"
                    );
                    sleep(self.delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl Default for RateLimitRetry {
    fn default() -> Self {
        Self::once_after(DEFAULT_RETRY_DELAY)
    }
}
