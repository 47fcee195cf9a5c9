//! Fixed-cadence status polling for accepted jobs.
//!
//! Once the engine acknowledges a job, [`ResultPoller::poll`] queries the
//! status endpoint until a record carries a result URL, reports a
//! failure, or the attempt budget runs out. There is no backoff: every
//! attempt, the last one included, is followed by the same interval, and
//! a failed query simply uses up one attempt.
//!
//! There is no cancel primitive. A caller that no longer cares about a
//! job drops the future, or lets it finish and ignores the result.

use std::sync::Arc;
use std::time::Duration;

use tryon_core::normalize::classify_status;
use tryon_core::outcome::PollOutcome;
use tryon_core::share_link::ShareLinkRewriter;

use crate::backend::WorkflowBackend;
use crate::error::GenerationError;

/// Cadence and budget for status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between consecutive attempts.
    pub interval: Duration,
    /// Attempts made before giving up with a timeout.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 20,
        }
    }
}

impl PollConfig {
    /// Worst-case time from the first attempt to a timeout.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Polls the status endpoint for one correlation id at a time.
pub struct ResultPoller<B: ?Sized> {
    backend: Arc<B>,
    config: PollConfig,
    share_links: ShareLinkRewriter,
}

impl<B: WorkflowBackend + ?Sized> ResultPoller<B> {
    pub fn new(backend: Arc<B>, config: PollConfig, share_links: ShareLinkRewriter) -> Self {
        Self {
            backend,
            config,
            share_links,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll until the job resolves; returns the result URL.
    pub async fn poll(&self, correlation_id: &str) -> Result<String, GenerationError> {
        self.poll_with_progress(correlation_id, |_| {}).await
    }

    /// Like [`poll`](Self::poll), calling `on_attempt` with the 1-based
    /// attempt number before each status query.
    pub async fn poll_with_progress<F>(
        &self,
        correlation_id: &str,
        mut on_attempt: F,
    ) -> Result<String, GenerationError>
    where
        F: FnMut(u32) + Send,
    {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            on_attempt(attempt);
            tracing::debug!(
                correlation_id = %correlation_id,
                attempt,
                max_attempts,
                "Polling job status",
            );

            match self.check_once(correlation_id).await {
                PollOutcome::Complete { url } => {
                    tracing::info!(
                        correlation_id = %correlation_id,
                        attempt,
                        url = %url,
                        "Image generation completed",
                    );
                    return Ok(url);
                }
                PollOutcome::Failed { reason } => {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        attempt,
                        reason = %reason,
                        "Backend reported generation failure",
                    );
                    return Err(GenerationError::BackendRejected(reason));
                }
                PollOutcome::Pending => {
                    tracing::debug!(correlation_id = %correlation_id, attempt, "Still processing");
                }
            }

            tokio::time::sleep(self.config.interval).await;
        }

        tracing::warn!(
            correlation_id = %correlation_id,
            max_attempts,
            "Polling budget exhausted",
        );
        Err(GenerationError::Timeout {
            attempts: max_attempts,
        })
    }

    /// Run a single status query.
    ///
    /// Transport and status errors are logged and reported as `Pending`.
    pub async fn check_once(&self, correlation_id: &str) -> PollOutcome {
        match self.backend.query_status(correlation_id).await {
            Ok(body) => classify_status(&body).rewrite_url(&self.share_links),
            Err(e) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "Status query failed, will retry",
                );
                PollOutcome::Pending
            }
        }
    }
}
