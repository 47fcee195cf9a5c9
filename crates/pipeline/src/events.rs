//! Broadcast sink for generation lifecycle events.
//!
//! [`EventBroadcaster`] implements [`GenerationCallbacks`] by publishing
//! a [`GenerationEvent`] per notification on a `tokio::sync::broadcast`
//! channel, so any number of UI surfaces can follow one job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::callbacks::GenerationCallbacks;
use crate::session::JobState;

// ---------------------------------------------------------------------------
// GenerationEvent
// ---------------------------------------------------------------------------

/// One lifecycle notification, timestamped when it was published.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationEvent {
    #[serde(flatten)]
    pub kind: GenerationEventKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEventKind {
    /// Inputs accepted; the job is about to be submitted.
    Started { primary: String, overlay: String },

    StateChanged { state: JobState },

    PollAttempt { attempt: u32, max_attempts: u32 },

    Completed { result_url: String },

    Failed { message: String },
}

impl GenerationEvent {
    pub fn new(kind: GenerationEventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

pub struct EventBroadcaster {
    sender: broadcast::Sender<GenerationEvent>,
}

impl EventBroadcaster {
    /// Create a broadcaster with a specific channel capacity.
    ///
    /// Slow receivers that fall behind observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, kind: GenerationEventKind) {
        // No receivers is fine; the event is dropped.
        let _ = self.sender.send(GenerationEvent::new(kind));
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl GenerationCallbacks for EventBroadcaster {
    fn on_generation_start(&self, primary: &str, overlay: &str) {
        self.publish(GenerationEventKind::Started {
            primary: primary.to_string(),
            overlay: overlay.to_string(),
        });
    }

    fn on_generation_complete(&self, result_url: &str) {
        self.publish(GenerationEventKind::Completed {
            result_url: result_url.to_string(),
        });
    }

    fn on_error(&self, message: &str) {
        self.publish(GenerationEventKind::Failed {
            message: message.to_string(),
        });
    }

    fn on_state_changed(&self, state: JobState) {
        self.publish(GenerationEventKind::StateChanged { state });
    }

    fn on_poll_attempt(&self, attempt: u32, max_attempts: u32) {
        self.publish(GenerationEventKind::PollAttempt {
            attempt,
            max_attempts,
        });
    }
}
