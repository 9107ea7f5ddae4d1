#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use cosmos_client::api::ApiClient;
use cosmos_client::error::TransportError;
use cosmos_client::notify::Notifier;
use cosmos_client::transport::{RequestDescriptor, RequestOutcome, Transport};
use cosmos_client::Normalizer;

pub const GOOD_PASSWORD: &str = "hunter2";

/// In-memory transport answering from a queue and recording every request
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<RequestOutcome, TransportError>>>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, status: u16, body: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(RequestOutcome::text(status, body)));
        self.clone()
    }

    pub fn fail(self: &Arc<Self>, reason: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Request(reason.to_string())));
        self.clone()
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn perform(&self, request: RequestDescriptor) -> Result<RequestOutcome, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted reply left".into())))
    }
}

/// Notifier whose messages are collected for assertions
pub fn recording_notifier() -> (Notifier, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let notifier = Notifier::with_sink(move |message| sink.lock().unwrap().push(message.to_string()));
    (notifier, seen)
}

pub fn client<T: Transport>(transport: Arc<T>, notifier: Notifier) -> ApiClient<T> {
    ApiClient::new(transport, Normalizer::new(notifier))
}

/// Start a stand-in Cosmos backend on a free local port and return its base URL
pub async fn spawn_backend() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;

    let app = Router::new()
        .route("/cosmos/api/sudo", post(sudo))
        .route(
            "/cosmos/api/mounts",
            get(|| async { Json(json!({ "data": [{ "path": "/mnt/secure" }], "status": "OK" })) }),
        )
        .route(
            "/text-error",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream is down") }),
        )
        .route(
            "/rclone",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "rclone is not running" })),
                )
            }),
        );

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind stand-in backend")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

async fn sudo(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == GOOD_PASSWORD {
        (StatusCode::OK, Json(json!({ "status": "OK" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad creds" })))
    }
}
