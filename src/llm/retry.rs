//! Bounded retry with exponential backoff for generation calls.

use super::{GenerationRequest, TextGenerator};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retries transient generation failures a bounded number of times.
///
/// The delay before retry `n` (1-based) is `base_delay * 2^(n-1)`. Errors that
/// are not transient are returned immediately.
pub struct RetryingGenerator {
    inner: Arc<dyn TextGenerator>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

#[async_trait]
impl TextGenerator for RetryingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Generation attempt {} failed, retrying in {:?}: {}",
                        attempt, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
