use std::time::Duration;

use tryon_core::error::CoreError;
use tryon_core::share_link::{ShareLinkRewriter, DEFAULT_SHARE_HOST};

use crate::poller::PollConfig;

/// Default per-attempt timeout for status queries.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Workflow engine configuration loaded from environment variables.
///
/// Endpoints are required; timing falls back to the engine's documented
/// cadence (one status query every 5 seconds, 20 attempts).
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Job intake endpoint (POST).
    pub intake_url: String,
    /// Status query endpoint (GET, `?userId=`).
    pub status_url: String,
    /// Poll cadence and budget.
    pub poll: PollConfig,
    /// Timeout for a single status query.
    pub status_timeout: Duration,
    /// Optional bound on the intake call; `None` leaves the transport default.
    pub submit_timeout: Option<Duration>,
    /// Sharing hosts whose view links are turned into direct downloads.
    pub share_links: ShareLinkRewriter,
}

impl WorkflowConfig {
    /// Configuration with default timing for the given endpoints.
    pub fn new(intake_url: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self {
            intake_url: intake_url.into(),
            status_url: status_url.into(),
            poll: PollConfig::default(),
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            submit_timeout: None,
            share_links: ShareLinkRewriter::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// | Env Var               | Default            |
    /// |-----------------------|--------------------|
    /// | `TRYON_INTAKE_URL`    | required           |
    /// | `TRYON_STATUS_URL`    | required           |
    /// | `POLL_INTERVAL_SECS`  | `5`                |
    /// | `POLL_MAX_ATTEMPTS`   | `20`               |
    /// | `STATUS_TIMEOUT_SECS` | `10`               |
    /// | `SUBMIT_TIMEOUT_SECS` | unset              |
    /// | `SHARE_LINK_HOSTS`    | `drive.google.com` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CoreError::Config(format!("{key} must be set")))
        };

        let mut config = Self::new(required("TRYON_INTAKE_URL")?, required("TRYON_STATUS_URL")?);

        if let Some(secs) = parse_u64(&lookup, "POLL_INTERVAL_SECS")? {
            config.poll.interval = Duration::from_secs(secs);
        }

        if let Some(attempts) = parse_u64(&lookup, "POLL_MAX_ATTEMPTS")? {
            config.poll.max_attempts = u32::try_from(attempts)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    CoreError::Config("POLL_MAX_ATTEMPTS must be between 1 and u32::MAX".into())
                })?;
        }

        if let Some(secs) = parse_u64(&lookup, "STATUS_TIMEOUT_SECS")? {
            config.status_timeout = Duration::from_secs(secs);
        }

        config.submit_timeout = parse_u64(&lookup, "SUBMIT_TIMEOUT_SECS")?.map(Duration::from_secs);

        let hosts = lookup("SHARE_LINK_HOSTS").unwrap_or_else(|| DEFAULT_SHARE_HOST.into());
        config.share_links = ShareLinkRewriter::new(hosts.split(','));

        Ok(config)
    }
}

/// Parse an optional integer variable; blank counts as unset.
fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| CoreError::Config(format!("{key} must be a valid u64, got '{v}'"))),
    }
}
