//! Bounded retry with a per-attempt deadline for collaborator calls.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use orgshare_core::config::PropagationConfig;
use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;

use super::stats::PropagationStats;

/// Why a unit of propagation work gave up.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// Transient failure that outlived every retry
    #[error("{operation} failed after {attempts} attempts: {source}")]
    Transient {
        /// Operation that failed.
        operation: &'static str,
        /// Attempts made.
        attempts: u32,
        /// Last error seen.
        #[source]
        source: AppError,
    },

    /// Failure that retrying cannot fix
    #[error("{operation} failed: {source}")]
    Permanent {
        /// Operation that failed.
        operation: &'static str,
        /// The error.
        #[source]
        source: AppError,
    },
}

impl UnitError {
    /// The operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Transient { operation, .. } | Self::Permanent { operation, .. } => operation,
        }
    }
}

/// Runs collaborator calls under the configured timeout and backoff.
#[derive(Debug, Clone)]
pub struct Retrier {
    config: PropagationConfig,
    stats: Arc<PropagationStats>,
}

impl Retrier {
    /// Creates a retrier counting retries into `stats`.
    pub fn new(config: PropagationConfig, stats: Arc<PropagationStats>) -> Self {
        Self { config, stats }
    }

    fn backoff(&self) -> ExponentialBuilder {
        // backon counts retries, not attempts.
        let max_retries = self.config.max_attempts.max(1).saturating_sub(1) as usize;
        ExponentialBuilder::new()
            .with_min_delay(self.config.initial_backoff())
            .with_max_delay(self.config.max_backoff())
            .with_max_times(max_retries)
    }

    /// Call `call` until it succeeds, fails permanently, or runs out of
    /// attempts. Each attempt is cut off after the operation timeout, which
    /// counts as a transient failure.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, UnitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let deadline = self.config.operation_timeout();
        let attempts = AtomicU32::new(0);

        let attempt = || {
            attempts.fetch_add(1, Ordering::SeqCst);
            let fut = call();
            async move {
                tokio::time::timeout(deadline, fut).await.unwrap_or_else(|_| {
                    Err(AppError::timeout(format!(
                        "{operation} did not complete within {}ms",
                        deadline.as_millis()
                    )))
                })
            }
        };

        attempt
            .retry(self.backoff())
            .sleep(tokio::time::sleep)
            .when(AppError::is_transient)
            .notify(|err: &AppError, delay: Duration| {
                PropagationStats::inc(&self.stats.retries);
                warn!(
                    operation,
                    attempt = attempts.load(Ordering::SeqCst),
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
            })
            .await
            .map_err(|err| {
                if err.is_transient() {
                    UnitError::Transient {
                        operation,
                        attempts: attempts.load(Ordering::SeqCst),
                        source: err,
                    }
                } else {
                    UnitError::Permanent {
                        operation,
                        source: err,
                    }
                }
            })
    }
}
