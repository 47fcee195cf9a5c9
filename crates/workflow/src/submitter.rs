//! Single-shot job submission.
//!
//! [`JobSubmitter`] sends one request to the intake endpoint and
//! classifies the reply. It never retries and never starts polling; the
//! caller decides what to do with an `Accepted` outcome so it can show a
//! "submitted" state before entering the "waiting" state.

use std::sync::Arc;

use tryon_core::job::JobRequest;
use tryon_core::normalize::classify_intake;
use tryon_core::outcome::JobSubmissionOutcome;
use tryon_core::share_link::ShareLinkRewriter;

use crate::api::WorkflowApiError;
use crate::backend::WorkflowBackend;
use crate::error::GenerationError;

/// Stateless submitter; safe to share and to call concurrently.
pub struct JobSubmitter<B: ?Sized> {
    backend: Arc<B>,
    share_links: ShareLinkRewriter,
}

impl<B: WorkflowBackend + ?Sized> JobSubmitter<B> {
    pub fn new(backend: Arc<B>, share_links: ShareLinkRewriter) -> Self {
        Self {
            backend,
            share_links,
        }
    }

    /// Submit `request` once.
    ///
    /// Returns `Err` only when nothing usable came back: invalid input
    /// (no network call made) or a request that never got a response.
    /// Every response that did arrive is classified into an outcome.
    pub async fn submit(
        &self,
        request: &JobRequest,
    ) -> Result<JobSubmissionOutcome, GenerationError> {
        request.validate()?;

        tracing::info!(
            correlation_id = %request.correlation_id,
            "Submitting try-on job",
        );

        let outcome = match self.backend.submit_job(request).await {
            Ok(body) => classify_intake(body, &request.correlation_id),
            Err(WorkflowApiError::ApiError { status, body }) => {
                tracing::error!(status, body = %body, "Job intake returned an error status");
                JobSubmissionOutcome::Failed {
                    reason: format!("Request failed with status {status}"),
                }
            }
            Err(WorkflowApiError::InvalidBody { body }) => JobSubmissionOutcome::Unrecognized {
                raw: serde_json::Value::String(body),
            },
            Err(WorkflowApiError::Request(e)) => {
                tracing::error!(error = %e, "Job intake request failed");
                return Err(GenerationError::network());
            }
        };

        match &outcome {
            JobSubmissionOutcome::ImmediateResult { url } => {
                tracing::info!(url = %url, "Job completed synchronously");
            }
            JobSubmissionOutcome::Accepted { correlation_id } => {
                tracing::info!(correlation_id = %correlation_id, "Job accepted for processing");
            }
            JobSubmissionOutcome::Failed { .. } => {}
            JobSubmissionOutcome::Unrecognized { raw } => {
                tracing::error!(raw = %raw, "Unexpected intake response format");
            }
        }

        Ok(outcome.rewrite_url(&self.share_links))
    }
}
