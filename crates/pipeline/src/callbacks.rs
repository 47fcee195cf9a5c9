//! Hooks the controller uses to report a job to the UI.

use crate::session::JobState;

/// Receiver of job lifecycle notifications.
///
/// For one job, `on_generation_start` fires before either
/// `on_generation_complete` or `on_error`, and each fires at most once.
/// A request rejected by validation only gets `on_error`. A request
/// dropped as a duplicate gets nothing.
pub trait GenerationCallbacks: Send + Sync {
    fn on_generation_start(&self, primary: &str, overlay: &str);

    fn on_generation_complete(&self, result_url: &str);

    fn on_error(&self, message: &str);

    /// Session state moved (submitting, polling, done, errored).
    fn on_state_changed(&self, _state: JobState) {}

    /// A status query is about to be made.
    fn on_poll_attempt(&self, _attempt: u32, _max_attempts: u32) {}
}
