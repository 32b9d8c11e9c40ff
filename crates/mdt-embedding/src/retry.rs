//! Bounded retry with a fixed delay, plus a timeout-enforcing embedder wrapper.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::embedding::Embedder;
use crate::error::{EmbeddingError, Result};

/// Default number of attempts (including the first one).
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default delay between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, never less than one.
    pub attempts: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl RetryPolicy {
    /// Create a policy. Zero attempts is treated as one.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// A single attempt with no retry.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Backoff schedule for `backoff::future::retry`.
    pub fn backoff(&self) -> FixedRetries {
        FixedRetries {
            policy: *self,
            retries_left: self.attempts - 1,
        }
    }
}

/// Constant-delay schedule that gives up after a fixed number of retries.
#[derive(Debug, Clone)]
pub struct FixedRetries {
    policy: RetryPolicy,
    retries_left: u32,
}

impl Backoff for FixedRetries {
    fn reset(&mut self) {
        self.retries_left = self.policy.attempts - 1;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        Some(self.policy.delay)
    }
}

/// Wraps an embedder with a per-call timeout and bounded retry.
///
/// Only transient errors are retried. Permanent errors surface after the
/// first attempt.
pub struct RetryingEmbedder<E> {
    inner: E,
    timeout: Duration,
    policy: RetryPolicy,
}

impl<E: Embedder> RetryingEmbedder<E> {
    /// Wrap `inner`.
    pub fn new(inner: E, timeout: Duration, policy: RetryPolicy) -> Self {
        Self {
            inner,
            timeout,
            policy,
        }
    }

    /// The wrapped embedder.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: Embedder> Embedder for RetryingEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let inner = &self.inner;
        let limit = self.timeout;

        let attempt = move || async move {
            match tokio::time::timeout(limit, inner.embed(text)).await {
                Ok(Ok(vector)) => Ok(vector),
                Ok(Err(err)) if err.is_transient() => Err(backoff::Error::transient(err)),
                Ok(Err(err)) => Err(backoff::Error::permanent(err)),
                Err(_) => Err(backoff::Error::transient(EmbeddingError::Timeout(limit))),
            }
        };

        backoff::future::retry_notify(
            self.policy.backoff(),
            attempt,
            |err: EmbeddingError, wait: Duration| {
                warn!(error = %err, retry_in = ?wait, "Embedding call failed, retrying");
            },
        )
        .await
    }
}
