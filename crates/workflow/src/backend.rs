//! Transport seam between the job protocol and the HTTP client.
//!
//! [`JobSubmitter`](crate::submitter::JobSubmitter) and
//! [`ResultPoller`](crate::poller::ResultPoller) depend on this trait
//! rather than on [`WorkflowApi`] directly, so tests can script engine
//! replies without a network.

use async_trait::async_trait;
use tryon_core::job::JobRequest;

use crate::api::{WorkflowApi, WorkflowApiError};

#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Send a job to the intake endpoint and return the raw JSON reply.
    async fn submit_job(&self, request: &JobRequest) -> Result<serde_json::Value, WorkflowApiError>;

    /// Fetch the raw status body for `correlation_id`.
    async fn query_status(&self, correlation_id: &str)
        -> Result<serde_json::Value, WorkflowApiError>;
}

#[async_trait]
impl WorkflowBackend for WorkflowApi {
    async fn submit_job(&self, request: &JobRequest) -> Result<serde_json::Value, WorkflowApiError> {
        WorkflowApi::submit_job(self, &request.to_payload()).await
    }

    async fn query_status(
        &self,
        correlation_id: &str,
    ) -> Result<serde_json::Value, WorkflowApiError> {
        WorkflowApi::query_status(self, correlation_id).await
    }
}
