//! Generation controller for the try-on widget.
//!
//! Owns the single [`session::JobSession`], admits at most one job at a
//! time, drives submit → poll through `tryon-workflow`, and reports the
//! outcome through [`callbacks::GenerationCallbacks`].

pub mod callbacks;
pub mod controller;
pub mod events;
pub mod session;

pub use callbacks::GenerationCallbacks;
pub use controller::{GenerateOutcome, GenerationController};
pub use events::{EventBroadcaster, GenerationEvent, GenerationEventKind};
pub use session::{JobSession, JobState};
