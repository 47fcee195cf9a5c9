//! Classified results of a submission and of a single status poll.

use serde::Serialize;

use crate::share_link::ShareLinkRewriter;

/// How the intake endpoint answered a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobSubmissionOutcome {
    /// The engine finished synchronously; no polling needed.
    ImmediateResult { url: String },
    /// The engine queued the job under `correlation_id`.
    Accepted { correlation_id: String },
    /// Non-success HTTP status.
    Failed { reason: String },
    /// A 2xx body matching none of the known shapes.
    Unrecognized { raw: serde_json::Value },
}

impl JobSubmissionOutcome {
    /// Apply the share-link rewrite to an immediate result URL.
    ///
    /// Every other variant is returned untouched.
    pub fn rewrite_url(self, rewriter: &ShareLinkRewriter) -> Self {
        match self {
            JobSubmissionOutcome::ImmediateResult { url } => JobSubmissionOutcome::ImmediateResult {
                url: rewriter.rewrite(&url),
            },
            other => other,
        }
    }
}

/// Result of one status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollOutcome {
    Pending,
    Complete { url: String },
    Failed { reason: String },
}

impl PollOutcome {
    /// Apply the share-link rewrite to a completed URL only.
    pub fn rewrite_url(self, rewriter: &ShareLinkRewriter) -> Self {
        match self {
            PollOutcome::Complete { url } => PollOutcome::Complete {
                url: rewriter.rewrite(&url),
            },
            other => other,
        }
    }
}
