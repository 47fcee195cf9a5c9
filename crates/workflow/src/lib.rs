//! Workflow-engine client for the try-on generator.
//!
//! Provides the HTTP API wrapper, the [`backend::WorkflowBackend`] seam,
//! the single-shot [`submitter::JobSubmitter`], the bounded
//! [`poller::ResultPoller`], and the error taxonomy reported to the UI.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod poller;
pub mod submitter;
