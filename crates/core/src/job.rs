//! Job request construction, validation and the intake wire payload.
//!
//! A try-on job always carries exactly two inputs: the primary subject
//! (the person) and the overlay item (the garment). Inputs are encoded
//! image strings, normally `data:` URLs, but a plain product image URL
//! is accepted for the overlay when it was preloaded from a listing.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Label the engine uses for the primary subject image.
pub const LABEL_PRIMARY: &str = "human_image";
/// Label the engine uses for the overlay item image.
pub const LABEL_OVERLAY: &str = "cloth_image";

/// Message reported when either input is missing.
pub const MISSING_INPUTS_MESSAGE: &str = "Please upload both human and cloth images";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Which slot of the job an input fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRole {
    Primary,
    Overlay,
}

impl InputRole {
    /// Engine-side label for this role.
    pub fn label(self) -> &'static str {
        match self {
            InputRole::Primary => LABEL_PRIMARY,
            InputRole::Overlay => LABEL_OVERLAY,
        }
    }
}

/// One encoded image bound to its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedInput {
    pub role: InputRole,
    pub data: String,
}

impl NamedInput {
    pub fn new(role: InputRole, data: impl Into<String>) -> Self {
        Self {
            role,
            data: data.into(),
        }
    }

    fn is_present(&self) -> bool {
        !self.data.trim().is_empty()
    }
}

/// Check that both inputs were supplied and are non-empty.
///
/// Used by the controller before a session is opened, so a missing
/// input never reaches the network.
pub fn validate_inputs(primary: Option<&str>, overlay: Option<&str>) -> Result<(), CoreError> {
    let present = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
    if present(primary) && present(overlay) {
        Ok(())
    } else {
        Err(CoreError::Validation(MISSING_INPUTS_MESSAGE.to_string()))
    }
}

// ---------------------------------------------------------------------------
// JobRequest
// ---------------------------------------------------------------------------

/// A fully assembled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    /// Caller-assigned id; the engine may hand back a different one.
    pub correlation_id: String,
    pub primary: NamedInput,
    pub overlay: NamedInput,
    pub submitted_at: Timestamp,
}

impl JobRequest {
    /// Build a request stamped with the current time.
    pub fn new(
        correlation_id: impl Into<String>,
        primary: impl Into<String>,
        overlay: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            primary: NamedInput::new(InputRole::Primary, primary),
            overlay: NamedInput::new(InputRole::Overlay, overlay),
            submitted_at: chrono::Utc::now(),
        }
    }

    /// Inputs in submission order.
    pub fn inputs(&self) -> [&NamedInput; 2] {
        [&self.primary, &self.overlay]
    }

    /// Reject requests that must not be sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.correlation_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "correlation id must not be empty".to_string(),
            ));
        }
        if self.inputs().iter().all(|input| input.is_present()) {
            Ok(())
        } else {
            Err(CoreError::Validation(MISSING_INPUTS_MESSAGE.to_string()))
        }
    }

    /// Borrowing view in the shape the intake webhook expects.
    pub fn to_payload(&self) -> IntakePayload<'_> {
        IntakePayload {
            user_id: &self.correlation_id,
            human_image: &self.primary.data,
            cloth_image: &self.overlay.data,
            image_labels: ImageLabels {
                human: InputRole::Primary.label(),
                cloth: InputRole::Overlay.label(),
            },
            timestamp: self.submitted_at,
        }
    }
}

/// JSON body posted to the intake endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload<'a> {
    pub user_id: &'a str,
    pub human_image: &'a str,
    pub cloth_image: &'a str,
    pub image_labels: ImageLabels,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ImageLabels {
    pub human: &'static str,
    pub cloth: &'static str,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
