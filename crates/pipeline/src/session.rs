//! The single job session owned by the UI controller.
//!
//! A session is the one authoritative record of what the generator is
//! doing. Its [`JobState`] doubles as the admission guard: while it is
//! `Submitting` or `Polling`, new generation requests are dropped.

use serde::Serialize;
use tryon_core::types::Timestamp;

/// Lifecycle of the current job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Submitting,
    Polling,
    Done,
    Errored,
}

impl JobState {
    /// Whether a job is in flight and new requests must be refused.
    pub fn is_busy(self) -> bool {
        matches!(self, JobState::Submitting | JobState::Polling)
    }
}

/// Process-local record of the current job.
///
/// `epoch` advances whenever a job begins or the session is reset. A job
/// remembers the epoch it started under; when it finishes under a
/// different epoch its result belongs to a discarded session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSession {
    pub epoch: u64,
    pub correlation_id: Option<String>,
    pub started_at: Option<Timestamp>,
    pub attempts_made: u32,
    pub state: JobState,
}

impl Default for JobSession {
    fn default() -> Self {
        Self {
            epoch: 0,
            correlation_id: None,
            started_at: None,
            attempts_made: 0,
            state: JobState::Idle,
        }
    }
}

impl JobSession {
    /// Start a new job; returns the epoch it runs under.
    pub fn begin(&mut self, correlation_id: impl Into<String>, now: Timestamp) -> u64 {
        self.epoch += 1;
        self.correlation_id = Some(correlation_id.into());
        self.started_at = Some(now);
        self.attempts_made = 0;
        self.state = JobState::Submitting;
        self.epoch
    }

    /// Whether `epoch` still identifies the live job.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Move a live job to `state`. Returns `false` for a stale epoch.
    pub fn transition(&mut self, epoch: u64, state: JobState) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        self.state = state;
        true
    }

    /// Switch to polling under the id the engine handed back.
    pub fn start_polling(&mut self, epoch: u64, correlation_id: &str) -> bool {
        if !self.transition(epoch, JobState::Polling) {
            return false;
        }
        self.correlation_id = Some(correlation_id.to_string());
        true
    }

    /// Record a poll attempt for a live job.
    pub fn record_attempt(&mut self, epoch: u64, attempt: u32) {
        if self.is_current(epoch) {
            self.attempts_made = attempt;
        }
    }

    /// Drop the current job and return to `Idle`.
    pub fn reset(&mut self) {
        *self = Self {
            epoch: self.epoch + 1,
            ..Self::default()
        };
    }
}
