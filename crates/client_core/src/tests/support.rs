use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use server_api::{clear_records, create_record, list_records, ApiContext};
use shared::error::ApiError;
use storage::{Clock, MemoryStore};
use tokio::net::TcpListener;

/// Clock that moves one second forward on every reading.
pub(crate) struct SteppingClock {
    next_secs: AtomicI64,
}

impl SteppingClock {
    pub(crate) fn starting_at(secs: i64) -> Arc<Self> {
        Arc::new(Self {
            next_secs: AtomicI64::new(secs),
        })
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.next_secs.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().expect("time")
    }
}

pub(crate) fn site_config() -> Value {
    json!({
        "pageTitle": "Postbox",
        "siteHeader": "Postbox Demo",
        "postSectionTitle": "Send a request",
        "receivePageTitle": "Received requests",
        "showReceiveTab": true,
        "formFields": [
            { "name": "name", "label": "Name", "type": "text" },
            { "name": "message", "label": "Message", "type": "textarea" }
        ],
        "backendApiUrl": "/api/posts"
    })
}

#[derive(Clone)]
struct BackendState {
    api: ApiContext,
    config: Option<Value>,
    fail_api: bool,
    fail_list: bool,
}

pub(crate) struct BackendOptions {
    pub(crate) store: MemoryStore,
    pub(crate) config: Option<Value>,
    pub(crate) fail_api: bool,
    /// Fails only GET, so writes still go through.
    pub(crate) fail_list: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            store: MemoryStore::new(),
            config: Some(site_config()),
            fail_api: false,
            fail_list: false,
        }
    }
}

pub(crate) struct TestBackend {
    pub(crate) url: String,
    pub(crate) store: MemoryStore,
}

pub(crate) async fn spawn_backend(options: BackendOptions) -> TestBackend {
    let state = BackendState {
        api: ApiContext::new(Arc::new(options.store.clone())),
        config: options.config,
        fail_api: options.fail_api,
        fail_list: options.fail_list,
    };
    let app = Router::new()
        .route("/config.json", get(config_json))
        .route(
            "/api/posts",
            get(list_posts).post(create_post).delete(clear_posts),
        )
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestBackend {
        url: format!("http://{addr}"),
        store: options.store,
    }
}

fn respond<T: Serialize>(result: Result<T, ApiError>, ok: StatusCode) -> Response {
    match result {
        Ok(value) => (ok, Json(value)).into_response(),
        Err(err) => {
            let status =
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(err)).into_response()
        }
    }
}

fn outage() -> Response {
    respond::<()>(Err(ApiError::internal("backend outage")), StatusCode::OK)
}

async fn config_json(State(state): State<BackendState>) -> Response {
    match state.config {
        Some(config) => Json(config).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_posts(State(state): State<BackendState>) -> Response {
    if state.fail_api || state.fail_list {
        return outage();
    }
    respond(list_records(&state.api).await, StatusCode::OK)
}

async fn create_post(State(state): State<BackendState>, body: Bytes) -> Response {
    if state.fail_api {
        return outage();
    }
    respond(create_record(&state.api, &body).await, StatusCode::CREATED)
}

async fn clear_posts(State(state): State<BackendState>) -> Response {
    if state.fail_api {
        return outage();
    }
    respond(clear_records(&state.api).await, StatusCode::OK)
}
