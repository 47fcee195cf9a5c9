//! REST client for the workflow engine's webhook endpoints.
//!
//! Wraps the two endpoints the generator consumes (job intake and status
//! query) using [`reqwest`]. Bodies are returned as raw JSON; shape
//! interpretation belongs to [`tryon_core::normalize`].

use std::time::Duration;

use tryon_core::job::IntakePayload;

use crate::config::WorkflowConfig;

/// HTTP client for one workflow engine deployment.
pub struct WorkflowApi {
    client: reqwest::Client,
    intake_url: String,
    status_url: String,
    status_timeout: Duration,
    submit_timeout: Option<Duration>,
}

/// Errors from the workflow REST layer.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine returned a non-2xx status code.
    #[error("Workflow API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body is not JSON.
    #[error("Workflow API returned a non-JSON body: {body}")]
    InvalidBody { body: String },
}

impl WorkflowApi {
    /// Create a client from resolved configuration.
    pub fn new(config: &WorkflowConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &WorkflowConfig) -> Self {
        Self {
            client,
            intake_url: config.intake_url.clone(),
            status_url: config.status_url.clone(),
            status_timeout: config.status_timeout,
            submit_timeout: config.submit_timeout,
        }
    }

    /// Post a job to the intake endpoint.
    ///
    /// No timeout is applied unless one was configured; the engine may
    /// hold the connection while it decides whether to answer
    /// synchronously.
    pub async fn submit_job(
        &self,
        payload: &IntakePayload<'_>,
    ) -> Result<serde_json::Value, WorkflowApiError> {
        let mut request = self.client.post(&self.intake_url).json(payload);
        if let Some(timeout) = self.submit_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        Self::parse_json(response).await
    }

    /// Query job status by correlation id (`GET <status_url>?userId=<id>`).
    pub async fn query_status(
        &self,
        correlation_id: &str,
    ) -> Result<serde_json::Value, WorkflowApiError> {
        let response = self
            .client
            .get(&self.status_url)
            .query(&[("userId", correlation_id)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.status_timeout)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`WorkflowApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, WorkflowApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WorkflowApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Read a successful body as JSON, keeping the text when it is not.
    async fn parse_json(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, WorkflowApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|_| WorkflowApiError::InvalidBody { body })
    }
}
