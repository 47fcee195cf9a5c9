//! `tryon-worker` -- runs one try-on generation from the command line.
//!
//! Encodes two local image files, submits them to the workflow engine,
//! waits for the result and prints the result URL on stdout.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default            | Description                        |
//! |-----------------------|----------|--------------------|------------------------------------|
//! | `TRYON_INTAKE_URL`    | yes      | --                 | Job intake endpoint (POST)         |
//! | `TRYON_STATUS_URL`    | yes      | --                 | Job status endpoint (GET)          |
//! | `PRIMARY_IMAGE_PATH`  | yes      | --                 | Image of the person                |
//! | `OVERLAY_IMAGE_PATH`  | yes      | --                 | Image of the garment               |
//! | `IDENTITY_FILE`       | no       | `.tryon-user-id`   | Where the user id is persisted     |
//! | `POLL_INTERVAL_SECS`  | no       | `5`                | Seconds between status queries     |
//! | `POLL_MAX_ATTEMPTS`   | no       | `20`               | Status queries before timing out   |
//! | `STATUS_TIMEOUT_SECS` | no       | `10`               | Per-query timeout                  |
//! | `SUBMIT_TIMEOUT_SECS` | no       | --                 | Intake request timeout             |
//! | `SHARE_LINK_HOSTS`    | no       | `drive.google.com` | Comma-separated share-link hosts   |

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tryon_core::identity::FileIdentityStore;
use tryon_pipeline::{EventBroadcaster, GenerateOutcome, GenerationController};
use tryon_worker::{inputs, progress};
use tryon_workflow::api::WorkflowApi;
use tryon_workflow::config::WorkflowConfig;

/// Default location of the persisted user id.
const DEFAULT_IDENTITY_FILE: &str = ".tryon-user-id";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tryon_worker=info,tryon_pipeline=info,tryon_workflow=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkflowConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let primary = load_image("PRIMARY_IMAGE_PATH");
    let overlay = load_image("OVERLAY_IMAGE_PATH");

    let identity_file =
        std::env::var("IDENTITY_FILE").unwrap_or_else(|_| DEFAULT_IDENTITY_FILE.to_string());

    tracing::info!(
        intake_url = %config.intake_url,
        status_url = %config.status_url,
        interval_secs = config.poll.interval.as_secs(),
        max_attempts = config.poll.max_attempts,
        poll_budget_secs = config.poll.budget().as_secs(),
        identity_file = %identity_file,
        "Starting tryon-worker",
    );

    let broadcaster = Arc::new(EventBroadcaster::default());
    let logger = tokio::spawn(progress::run(broadcaster.subscribe()));

    let controller = GenerationController::from_config(
        Arc::new(WorkflowApi::new(&config)),
        &config,
        Arc::new(FileIdentityStore::new(identity_file)),
        broadcaster,
    );

    let outcome = controller.generate(Some(&primary), Some(&overlay)).await;

    // Closing the broadcaster lets the logger drain and stop.
    drop(controller);
    if let Err(e) = logger.await {
        tracing::warn!(error = %e, "Progress logger task failed");
    }

    match outcome {
        GenerateOutcome::Completed(url) => println!("{url}"),
        GenerateOutcome::Failed(err) => {
            tracing::error!(error = %err, "Try-on generation failed");
            std::process::exit(1);
        }
        GenerateOutcome::Ignored | GenerateOutcome::Discarded => {
            tracing::error!("Try-on generation did not run to completion");
            std::process::exit(1);
        }
    }
}

/// Encode the image named by environment variable `var`, exiting on error.
fn load_image(var: &str) -> String {
    let path = std::env::var(var).unwrap_or_else(|_| {
        tracing::error!("{var} environment variable is required");
        std::process::exit(1);
    });

    inputs::encode_image_file(&path).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load {var}");
        std::process::exit(1);
    })
}
