//! Opt-in retry with exponential backoff and jitter.
//!
//! The loader itself fails fast. Callers that want resilience wrap their
//! provider in a [`RetryingProvider`] before handing it to the loader.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::warn;

use crate::provider::{HistoryRequest, PriceProvider, ProviderError, RawPriceTable};

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(3),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt.min(i32::MAX as u32) as i32);
                let seconds = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(seconds.max(0.0));

                if !jitter {
                    return delay;
                }
                let millis = delay.as_millis() as u64;
                let half = millis / 2;
                let offset = fastrand::u64(0..=half * 2);
                Duration::from_millis(millis - half + offset)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }
}

/// Provider wrapper that retries retryable failures.
#[derive(Debug, Clone)]
pub struct RetryingProvider<P> {
    inner: P,
    config: RetryConfig,
}

impl<P: PriceProvider> RetryingProvider<P> {
    pub fn new(inner: P, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn fetch_with_retry(&self, request: HistoryRequest) -> Result<RawPriceTable, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_history(request.clone()).await {
                Ok(table) => return Ok(table),
                Err(error) if error.retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff.delay(attempt);
                    warn!(
                        provider = self.inner.name(),
                        ticker = %request.ticker,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying provider fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl<P: PriceProvider> PriceProvider for RetryingProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn fetch_history<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawPriceTable, ProviderError>> + Send + 'a>> {
        Box::pin(self.fetch_with_retry(request))
    }
}
