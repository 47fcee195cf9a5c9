//! End-to-end tests of [`WorkflowApi`] against an in-process engine stub.
//!
//! The stub is a small axum router bound to an ephemeral port. It records
//! what it receives and replays scripted status replies, so these tests
//! exercise the real reqwest client, URL building and body handling.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use tryon_core::job::JobRequest;
use tryon_core::outcome::JobSubmissionOutcome;
use tryon_core::share_link::ShareLinkRewriter;
use tryon_workflow::api::WorkflowApi;
use tryon_workflow::config::WorkflowConfig;
use tryon_workflow::error::{GenerationError, NETWORK_ERROR_MESSAGE};
use tryon_workflow::poller::{PollConfig, ResultPoller};
use tryon_workflow::submitter::JobSubmitter;

// ---------------------------------------------------------------------------
// Engine stub
// ---------------------------------------------------------------------------

/// A scripted reply: status code plus raw body text.
type Reply = (StatusCode, String);

#[derive(Clone, Default)]
struct Stub {
    intake_reply: Arc<Mutex<Option<Reply>>>,
    status_replies: Arc<Mutex<VecDeque<Reply>>>,
    intake_bodies: Arc<Mutex<Vec<Value>>>,
    status_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Stub {
    fn with_intake(self, status: StatusCode, body: &str) -> Self {
        *self.intake_reply.lock().unwrap() = Some((status, body.to_string()));
        self
    }

    fn with_status(self, status: StatusCode, body: &str) -> Self {
        self.status_replies
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
        self
    }
}

fn reply((status, body): Reply) -> Response {
    (status, [("content-type", "application/json")], body).into_response()
}

async fn intake(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.intake_bodies.lock().unwrap().push(body);
    let scripted = stub.intake_reply.lock().unwrap().clone();
    reply(scripted.unwrap_or((StatusCode::OK, r#"{"status":"started"}"#.to_string())))
}

async fn status(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.status_queries.lock().unwrap().push(params);
    let scripted = stub.status_replies.lock().unwrap().pop_front();
    reply(scripted.unwrap_or((StatusCode::OK, r#"{"status":"processing"}"#.to_string())))
}

/// Serve the stub and return a config pointing at it.
async fn spawn_engine(stub: Stub) -> WorkflowConfig {
    let app = Router::new()
        .route("/webhook/try-on", post(intake))
        .route("/webhook/try-on-status", get(status))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    let mut config = WorkflowConfig::new(
        format!("http://{addr}/webhook/try-on"),
        format!("http://{addr}/webhook/try-on-status"),
    );
    config.poll = PollConfig {
        interval: Duration::from_millis(10),
        max_attempts: 5,
    };
    config.share_links = ShareLinkRewriter::new(["drive.example.com"]);
    config
}

fn request() -> JobRequest {
    JobRequest::new("u0", "data:image/png;base64,SFVNQU4=", "data:image/png;base64,Q0xPVEg=")
}

// ---------------------------------------------------------------------------
// Test: intake payload uses the engine's field names
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_posts_engine_payload_and_reads_ack() {
    let stub = Stub::default().with_intake(StatusCode::OK, r#"{"status":"started","userId":"u1"}"#);
    let config = spawn_engine(stub.clone()).await;
    let api = Arc::new(WorkflowApi::new(&config));

    let outcome = JobSubmitter::new(api, config.share_links.clone())
        .submit(&request())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        JobSubmissionOutcome::Accepted {
            correlation_id: "u1".into()
        }
    );

    let bodies = stub.intake_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["userId"], "u0");
    assert_eq!(bodies[0]["humanImage"], "data:image/png;base64,SFVNQU4=");
    assert_eq!(bodies[0]["clothImage"], "data:image/png;base64,Q0xPVEg=");
    assert_eq!(bodies[0]["imageLabels"]["human"], "human_image");
    assert_eq!(bodies[0]["imageLabels"]["cloth"], "cloth_image");
}

// ---------------------------------------------------------------------------
// Test: non-success intake status becomes a Failed outcome
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_error_status_is_failed() {
    let stub = Stub::default().with_intake(StatusCode::SERVICE_UNAVAILABLE, "down");
    let config = spawn_engine(stub).await;
    let api = Arc::new(WorkflowApi::new(&config));

    let outcome = JobSubmitter::new(api, config.share_links.clone())
        .submit(&request())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        JobSubmissionOutcome::Failed {
            reason: "Request failed with status 503".into()
        }
    );
}

// ---------------------------------------------------------------------------
// Test: a 200 with a non-JSON body is unrecognized, not success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_non_json_body_is_unrecognized() {
    let stub = Stub::default().with_intake(StatusCode::OK, "Workflow was started");
    let config = spawn_engine(stub).await;
    let api = Arc::new(WorkflowApi::new(&config));

    let outcome = JobSubmitter::new(api, config.share_links.clone())
        .submit(&request())
        .await
        .unwrap();

    assert_matches!(
        outcome,
        JobSubmissionOutcome::Unrecognized { raw } if raw == json!("Workflow was started")
    );
}

// ---------------------------------------------------------------------------
// Test: unreachable engine is a transport error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_to_closed_port_is_network_error() {
    // Bind and immediately release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = WorkflowConfig::new(format!("http://{addr}/intake"), format!("http://{addr}/status"));
    let api = Arc::new(WorkflowApi::new(&config));

    let err = JobSubmitter::new(api, ShareLinkRewriter::default())
        .submit(&request())
        .await
        .unwrap_err();

    assert_eq!(err, GenerationError::Transport(NETWORK_ERROR_MESSAGE.into()));
}

// ---------------------------------------------------------------------------
// Test: polling passes userId and survives a failed attempt
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_queries_by_user_id_until_url() {
    let stub = Stub::default()
        .with_status(StatusCode::OK, r#"{"status":"processing"}"#)
        .with_status(StatusCode::BAD_GATEWAY, "upstream")
        .with_status(StatusCode::OK, r#"[{"imageUrl":"https://x/y.jpg","status":"processing"}]"#);
    let config = spawn_engine(stub.clone()).await;
    let api = Arc::new(WorkflowApi::new(&config));

    let url = ResultPoller::new(api, config.poll, config.share_links.clone())
        .poll("u1")
        .await
        .unwrap();

    assert_eq!(url, "https://x/y.jpg");

    let queries = stub.status_queries.lock().unwrap();
    assert_eq!(queries.len(), 3);
    assert!(queries.iter().all(|q| q.get("userId").map(String::as_str) == Some("u1")));
}

// ---------------------------------------------------------------------------
// Test: a failed record over HTTP is a backend rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_failed_record_is_rejected() {
    let stub = Stub::default().with_status(StatusCode::OK, r#"{"status":"failed","error":"bad input"}"#);
    let config = spawn_engine(stub).await;
    let api = Arc::new(WorkflowApi::new(&config));

    let err = ResultPoller::new(api, config.poll, config.share_links.clone())
        .poll("u1")
        .await
        .unwrap_err();

    assert_eq!(err, GenerationError::BackendRejected("bad input".into()));
}

// ---------------------------------------------------------------------------
// Test: a never-finishing job times out after the configured budget
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_times_out_after_budget() {
    let stub = Stub::default();
    let config = spawn_engine(stub.clone()).await;
    let api = Arc::new(WorkflowApi::new(&config));

    let err = ResultPoller::new(api, config.poll, config.share_links.clone())
        .poll("u1")
        .await
        .unwrap_err();

    assert_eq!(err, GenerationError::Timeout { attempts: 5 });
    assert_eq!(stub.status_queries.lock().unwrap().len(), 5);
}
