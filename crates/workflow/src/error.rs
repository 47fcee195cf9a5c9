//! Terminal failure taxonomy for one generation job.
//!
//! Every variant ends the job. Per-attempt poll failures are not
//! represented here: the poller absorbs them into its attempt budget.

use tryon_core::error::CoreError;

/// Message shown when the engine cannot be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: Unable to connect to the server. \
     Please check your internet connection or try again later.";

/// Message shown when the poll budget runs out.
pub const TIMEOUT_MESSAGE: &str = "Image generation timed out. Please try again.";

/// Message shown when the engine answers in an unknown shape.
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Unexpected response from server. Expected status: processing";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Inputs missing or another local precondition failed (such as
    /// the identity store); nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Submission could not be delivered or was answered with a
    /// non-success status. Carries the user-facing message.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine reported `status: "failed"` for the job.
    #[error("Generation rejected by backend: {0}")]
    BackendRejected(String),

    /// The poll budget was exhausted without a terminal record.
    #[error("Generation timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// A response matched none of the recognised shapes. Carries the raw
    /// body for diagnostics.
    #[error("Malformed response from backend: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Text handed to the UI's error callback.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(msg) => msg.clone(),
            GenerationError::Transport(msg) => msg.clone(),
            GenerationError::BackendRejected(reason) => reason.clone(),
            GenerationError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
            GenerationError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }

    /// Transport failure where no response arrived.
    pub fn network() -> Self {
        GenerationError::Transport(NETWORK_ERROR_MESSAGE.to_string())
    }
}

impl From<CoreError> for GenerationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => GenerationError::Validation(msg),
            other => GenerationError::Validation(other.to_string()),
        }
    }
}
