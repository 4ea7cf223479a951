//! Retry configuration, delay calculation, and the retrying transport.
//!
//! Provides [`RetryConfig`] for controlling retry behaviour and
//! [`RetryingTransport`], a decorator that wraps any [`Transport`] with
//! automatic retry on overload errors.
//!
//! All retry logic lives in the shared `with_retry()` helper so the
//! policy exists in exactly one place.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::transport::Transport;
use crate::telemetry;
use crate::{RagsweepError, Result};

/// Configuration for retry behaviour on overload errors.
///
/// Uses exponential backoff with jitter. The growth ceiling caps how far
/// the computed wait doubles; the sleep cap bounds every individual
/// sleep, including server `Retry-After` hints.
///
/// ```rust
/// # use ragsweep::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(3)
///     .initial_delay(Duration::from_millis(200))
///     .jitter(false);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 5.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 1s.
    pub initial_delay: Duration,
    /// Ceiling on the doubled backoff value. Default: 16s.
    pub backoff_ceiling: Duration,
    /// Absolute cap on any single sleep, `Retry-After` included.
    /// Default: 30s.
    pub max_sleep: Duration,
    /// Whether to add a uniform [0, 1) second of jitter to computed
    /// delays. Never applied to `Retry-After` hints. Default: true.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            backoff_ceiling: Duration::from_secs(16),
            max_sleep: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the ceiling on the doubled backoff value.
    pub fn backoff_ceiling(mut self, ceiling: Duration) -> Self {
        self.backoff_ceiling = ceiling;
        self
    }

    /// Set the absolute cap on any single sleep.
    pub fn max_sleep(mut self, cap: Duration) -> Self {
        self.max_sleep = cap;
        self
    }

    /// Enable or disable jitter.
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Calculate the backoff delay for a given attempt number (0-indexed).
    ///
    /// Uses exponential backoff: `initial_delay * 2^attempt`, capped at
    /// `backoff_ceiling`. Does NOT include jitter or the sleep cap — see
    /// [`effective_delay()`](Self::effective_delay) for the full calculation.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.backoff_ceiling)
    }

    /// Calculate the effective sleep, respecting server `Retry-After` hints.
    ///
    /// A hint overrides the computed backoff outright and receives no
    /// jitter. Either way the result is clamped to `max_sleep`.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(hint) => hint,
            None => {
                let mut delay = self.delay_for_attempt(attempt);
                if self.jitter {
                    delay += Duration::from_secs_f64(rand::random::<f64>());
                }
                delay
            }
        };
        delay.min(self.max_sleep)
    }
}

// ============================================================================
// Shared retry helper
// ============================================================================

/// Execute an async operation with retry logic.
///
/// Retries on overload errors (as classified by
/// [`RagsweepError::is_transient()`]) up to `config.max_attempts`, using
/// exponential backoff and respecting `Retry-After` hints. Every other
/// error is returned immediately without retry.
///
/// When the attempt budget is spent on overload errors, returns
/// [`RagsweepError::RetriesExhausted`] naming `url` and the last server
/// error text.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    client: &str,
    url: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..config.max_attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "client" => client.to_owned(),
                )
                .increment(1);
                if attempt + 1 < config.max_attempts {
                    let delay = config.effective_delay(attempt, e.retry_after());
                    warn!(
                        client,
                        url,
                        attempt = attempt + 1,
                        max_attempts = config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after overload"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e), // permanent error, no retry
        }
    }
    Err(RagsweepError::RetriesExhausted {
        url: url.to_string(),
        attempts: config.max_attempts,
        last_error: match last_err {
            Some(e) => e.server_text(),
            None => "no attempts were made".to_string(),
        },
    })
}

// ============================================================================
// RetryingTransport
// ============================================================================

/// Decorator that wraps a [`Transport`] with retry logic.
///
/// On overload errors (429/503), retries with exponential backoff up to
/// `config.max_attempts`, honouring server `Retry-After` hints. All other
/// errors pass through immediately.
pub struct RetryingTransport {
    inner: Arc<dyn Transport>,
    config: RetryConfig,
}

impl RetryingTransport {
    /// Wrap a transport with retry logic.
    pub fn new(inner: Arc<dyn Transport>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl Transport for RetryingTransport {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
    ) -> Result<Value> {
        with_retry(&self.config, self.inner.name(), url, || {
            self.inner.post_json(url, headers, body)
        })
        .await
    }
}
