//! Session-owning generation controller.
//!
//! [`GenerationController::generate`] is what the UI's "generate" button
//! calls. It admits at most one job at a time, submits it, hands an
//! accepted job to the poller, and reports the outcome through the
//! injected [`GenerationCallbacks`]. The submitter and poller never touch
//! the session; only this controller does.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tryon_core::identity::SessionIdentity;
use tryon_core::job::{validate_inputs, JobRequest};
use tryon_core::outcome::JobSubmissionOutcome;
use tryon_core::share_link::ShareLinkRewriter;
use tryon_workflow::backend::WorkflowBackend;
use tryon_workflow::config::WorkflowConfig;
use tryon_workflow::error::GenerationError;
use tryon_workflow::poller::{PollConfig, ResultPoller};
use tryon_workflow::submitter::JobSubmitter;

use crate::callbacks::GenerationCallbacks;
use crate::session::{JobSession, JobState};

/// What happened to one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Another job was in flight; the request was dropped.
    Ignored,
    /// The job finished with a result URL.
    Completed(String),
    /// The job failed; the error was reported through `on_error`.
    Failed(GenerationError),
    /// The session was reset while the job ran; nothing was reported.
    Discarded,
}

/// Result of the synchronous admission step.
enum Admission {
    Duplicate,
    Rejected(GenerationError),
    Admitted { epoch: u64, request: JobRequest },
}

pub struct GenerationController<B: ?Sized> {
    submitter: JobSubmitter<B>,
    poller: ResultPoller<B>,
    identity: Arc<dyn SessionIdentity>,
    callbacks: Arc<dyn GenerationCallbacks>,
    session: Mutex<JobSession>,
}

impl<B: WorkflowBackend + ?Sized> GenerationController<B> {
    pub fn new(
        backend: Arc<B>,
        poll: PollConfig,
        share_links: ShareLinkRewriter,
        identity: Arc<dyn SessionIdentity>,
        callbacks: Arc<dyn GenerationCallbacks>,
    ) -> Self {
        Self {
            submitter: JobSubmitter::new(Arc::clone(&backend), share_links.clone()),
            poller: ResultPoller::new(backend, poll, share_links),
            identity,
            callbacks,
            session: Mutex::new(JobSession::default()),
        }
    }

    /// Build a controller using the timing and share hosts in `config`.
    pub fn from_config(
        backend: Arc<B>,
        config: &WorkflowConfig,
        identity: Arc<dyn SessionIdentity>,
        callbacks: Arc<dyn GenerationCallbacks>,
    ) -> Self {
        Self::new(
            backend,
            config.poll,
            config.share_links.clone(),
            identity,
            callbacks,
        )
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> JobSession {
        self.lock_session().clone()
    }

    pub fn state(&self) -> JobState {
        self.lock_session().state
    }

    /// Forget the current job, as when the UI clears its history.
    ///
    /// A job still running keeps going until it settles, but its result
    /// is discarded and no callback fires for it.
    pub fn reset(&self) {
        let mut session = self.lock_session();
        if session.state.is_busy() {
            tracing::info!(
                correlation_id = ?session.correlation_id,
                "Resetting session with a job in flight",
            );
        }
        session.reset();
    }

    /// Run one generation job for the given pair of encoded images.
    ///
    /// Returns [`GenerateOutcome::Ignored`] without any callback when a
    /// job is already in flight.
    pub async fn generate(&self, primary: Option<&str>, overlay: Option<&str>) -> GenerateOutcome {
        let (epoch, request) = match self.admit(primary, overlay) {
            Admission::Duplicate => {
                tracing::debug!("Generation already in progress, ignoring duplicate request");
                return GenerateOutcome::Ignored;
            }
            Admission::Rejected(err) => {
                tracing::warn!(error = %err, "Generation request rejected");
                self.callbacks.on_error(&err.user_message());
                return GenerateOutcome::Failed(err);
            }
            Admission::Admitted { epoch, request } => (epoch, request),
        };

        self.callbacks
            .on_generation_start(&request.primary.data, &request.overlay.data);
        self.callbacks.on_state_changed(JobState::Submitting);

        let _in_flight = InFlight {
            session: &self.session,
            epoch,
        };

        let result = self.run(epoch, &request).await;
        self.finish(epoch, result)
    }

    // ---- private helpers ----

    fn lock_session(&self) -> MutexGuard<'_, JobSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check the guard, validate, and open the session in one critical
    /// section so two concurrent calls cannot both get through.
    fn admit(&self, primary: Option<&str>, overlay: Option<&str>) -> Admission {
        let mut session = self.lock_session();
        if session.state.is_busy() {
            return Admission::Duplicate;
        }

        if let Err(e) = validate_inputs(primary, overlay) {
            return Admission::Rejected(e.into());
        }

        let correlation_id = match self.identity.correlation_id() {
            Ok(id) => id,
            Err(e) => return Admission::Rejected(e.into()),
        };

        let request = JobRequest::new(
            correlation_id,
            primary.unwrap_or_default(),
            overlay.unwrap_or_default(),
        );
        let epoch = session.begin(request.correlation_id.clone(), request.submitted_at);

        tracing::info!(correlation_id = %request.correlation_id, epoch, "Generation started");
        Admission::Admitted { epoch, request }
    }

    /// Submit, then poll if the engine deferred the work.
    ///
    /// `None` means the session was reset before polling began.
    async fn run(&self, epoch: u64, request: &JobRequest) -> Option<Result<String, GenerationError>> {
        let outcome = match self.submitter.submit(request).await {
            Ok(outcome) => outcome,
            Err(e) => return Some(Err(e)),
        };

        let correlation_id = match outcome {
            JobSubmissionOutcome::ImmediateResult { url } => return Some(Ok(url)),
            JobSubmissionOutcome::Failed { reason } => {
                return Some(Err(GenerationError::Transport(reason)))
            }
            JobSubmissionOutcome::Unrecognized { raw } => {
                return Some(Err(GenerationError::MalformedResponse(raw.to_string())))
            }
            JobSubmissionOutcome::Accepted { correlation_id } => correlation_id,
        };

        if !self.lock_session().start_polling(epoch, &correlation_id) {
            tracing::info!(correlation_id = %correlation_id, "Session reset before polling, abandoning job");
            return None;
        }
        self.callbacks.on_state_changed(JobState::Polling);

        let max_attempts = self.poller.config().max_attempts;
        tracing::info!(
            correlation_id = %correlation_id,
            max_attempts,
            budget_secs = self.poller.config().budget().as_secs(),
            "Waiting for generation result",
        );
        let result = self
            .poller
            .poll_with_progress(&correlation_id, |attempt| {
                let current = {
                    let mut session = self.lock_session();
                    session.record_attempt(epoch, attempt);
                    session.is_current(epoch)
                };
                if current {
                    self.callbacks.on_poll_attempt(attempt, max_attempts);
                }
            })
            .await;

        Some(result)
    }

    /// Record the terminal state and notify the UI, unless the session
    /// moved on while the job ran.
    fn finish(&self, epoch: u64, result: Option<Result<String, GenerationError>>) -> GenerateOutcome {
        let Some(result) = result else {
            return GenerateOutcome::Discarded;
        };

        let terminal = if result.is_ok() {
            JobState::Done
        } else {
            JobState::Errored
        };
        if !self.lock_session().transition(epoch, terminal) {
            tracing::info!(epoch, "Discarding result of a reset session");
            return GenerateOutcome::Discarded;
        }
        self.callbacks.on_state_changed(terminal);

        match result {
            Ok(url) => {
                tracing::info!(url = %url, "Generation successful");
                self.callbacks.on_generation_complete(&url);
                GenerateOutcome::Completed(url)
            }
            Err(err) => {
                tracing::error!(error = %err, "Generation failed");
                self.callbacks.on_error(&err.user_message());
                GenerateOutcome::Failed(err)
            }
        }
    }
}

/// Releases the admission guard if a job exits without settling
/// (its future dropped or a panic unwinding through it).
struct InFlight<'a> {
    session: &'a Mutex<JobSession>,
    epoch: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.is_current(self.epoch) && session.state.is_busy() {
            tracing::warn!(epoch = self.epoch, "Generation abandoned before completion");
            session.state = JobState::Errored;
        }
    }
}
