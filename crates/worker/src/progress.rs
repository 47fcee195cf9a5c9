//! Background task that writes generation events to the log.

use tokio::sync::broadcast;
use tryon_pipeline::{GenerationEvent, GenerationEventKind};

/// Consume events until the broadcaster is dropped.
///
/// Returns the number of events logged.
pub async fn run(mut receiver: broadcast::Receiver<GenerationEvent>) -> usize {
    let mut logged = 0;
    loop {
        match receiver.recv().await {
            Ok(event) => {
                log_event(&event);
                logged += 1;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Progress logger lagged, some events were not logged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Event broadcaster closed, progress logger shutting down");
                break;
            }
        }
    }
    logged
}

fn log_event(event: &GenerationEvent) {
    match &event.kind {
        GenerationEventKind::Started { .. } => {
            tracing::info!(at = %event.timestamp, "Submitting try-on job");
        }
        GenerationEventKind::StateChanged { state } => {
            tracing::debug!(?state, "Job state changed");
        }
        GenerationEventKind::PollAttempt {
            attempt,
            max_attempts,
        } => {
            tracing::info!(attempt, max_attempts, "Waiting for result");
        }
        GenerationEventKind::Completed { result_url } => {
            tracing::info!(result_url = %result_url, "Result ready");
        }
        GenerationEventKind::Failed { message } => {
            tracing::error!(message = %message, "Generation failed");
        }
    }
}
