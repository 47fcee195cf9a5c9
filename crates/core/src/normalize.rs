//! Response normalizer for the loosely-typed workflow engine.
//!
//! The engine is a low-code webhook chain whose replies vary in shape:
//! the result URL may arrive under several field names, and status
//! records sometimes come back wrapped in a one-element array. All of
//! that shape-sniffing lives here so the fragile contract is in one
//! place.
//!
//! # Field precedence
//!
//! | Purpose                 | Fields, in order                               |
//! |-------------------------|------------------------------------------------|
//! | Immediate result URL    | `imageUrl`, `resultImageUrl`, `url`, `image`   |
//! | Acknowledgement status  | `status` in {`processing`, `started`}          |
//! | Server correlation id   | `userId`, else the caller's id                 |
//! | Poll completion         | `imageUrl` (wins over any `status`)            |
//! | Poll failure            | `status == "failed"`, reason from `error`      |
//!
//! A field only counts when it is a non-empty JSON string.

use serde_json::Value;

use crate::outcome::{JobSubmissionOutcome, PollOutcome};

/// Result URL fields checked on an intake response, highest priority first.
pub const IMMEDIATE_URL_FIELDS: [&str; 4] = ["imageUrl", "resultImageUrl", "url", "image"];

/// `status` values meaning the engine accepted the job for background work.
pub const ACCEPTED_STATUSES: [&str; 2] = ["processing", "started"];

/// Field carrying the server-assigned correlation id.
pub const CORRELATION_ID_FIELD: &str = "userId";

/// Field carrying the finished image on a status record.
pub const RESULT_URL_FIELD: &str = "imageUrl";

/// `status` value marking a failed job.
pub const STATUS_FAILED: &str = "failed";

/// Reason used when a failed record carries no `error` text.
pub const GENERIC_FAILURE_REASON: &str = "Image generation failed";

/// Non-empty string value of `field`, if any.
fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First non-empty result URL in [`IMMEDIATE_URL_FIELDS`] order.
pub fn extract_immediate_url(body: &Value) -> Option<&str> {
    IMMEDIATE_URL_FIELDS
        .iter()
        .find_map(|field| non_empty_str(body, field))
}

/// The record a status body describes.
///
/// Arrays yield their first element (`None` when empty); any other value
/// is the record itself.
pub fn extract_record(body: &Value) -> Option<&Value> {
    match body {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

/// Classify a successful intake response body.
///
/// `fallback_id` is the id the caller submitted under; it is used when the
/// acknowledgement does not name one.
pub fn classify_intake(body: Value, fallback_id: &str) -> JobSubmissionOutcome {
    if let Some(url) = extract_immediate_url(&body) {
        return JobSubmissionOutcome::ImmediateResult {
            url: url.to_string(),
        };
    }

    let accepted = body
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| ACCEPTED_STATUSES.contains(&s));

    if accepted {
        let correlation_id = non_empty_str(&body, CORRELATION_ID_FIELD).unwrap_or(fallback_id);
        return JobSubmissionOutcome::Accepted {
            correlation_id: correlation_id.to_string(),
        };
    }

    JobSubmissionOutcome::Unrecognized { raw: body }
}

/// Classify one status query body.
///
/// An empty array or a record with neither a URL nor a failed status is
/// still pending.
pub fn classify_status(body: &Value) -> PollOutcome {
    let Some(record) = extract_record(body) else {
        return PollOutcome::Pending;
    };

    if let Some(url) = non_empty_str(record, RESULT_URL_FIELD) {
        return PollOutcome::Complete {
            url: url.to_string(),
        };
    }

    if record.get("status").and_then(Value::as_str) == Some(STATUS_FAILED) {
        let reason = non_empty_str(record, "error").unwrap_or(GENERIC_FAILURE_REASON);
        return PollOutcome::Failed {
            reason: reason.to_string(),
        };
    }

    PollOutcome::Pending
}
