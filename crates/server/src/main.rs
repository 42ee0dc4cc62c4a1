use std::{any::Any, net::SocketAddr, path::Path, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use server_api::{clear_records, create_record, list_records, ApiContext};
use shared::{
    domain::Record,
    error::ApiError,
    protocol::{posts_route, MessageResponse},
};
use storage::MemoryStore;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, static_root};

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let public_dir = static_root(&settings);
    match &public_dir {
        Some(dir) => info!(dir = %dir.display(), "serving static site"),
        None => warn!("no public directory found; static site disabled"),
    }

    // Records live only as long as this process.
    let api = ApiContext::new(Arc::new(MemoryStore::new()));
    let app = build_router(Arc::new(AppState { api }), public_dir.as_deref());

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

const API_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
const API_METHODS_HEADER: &str = "GET, POST, DELETE, OPTIONS";

fn build_router(state: Arc<AppState>, public_dir: Option<&Path>) -> Router {
    let posts = get(http_list_posts)
        .post(http_create_post)
        .delete(http_clear_posts)
        .fallback(method_not_allowed);

    let api = Router::new()
        .route(posts_route(), posts)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(reject_head))
        .layer(middleware::from_fn(api_headers))
        .with_state(state);

    let mut app = Router::new().route("/healthz", get(healthz)).merge(api);
    if let Some(dir) = public_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    // Answers every OPTIONS request itself, whatever the path.
    app.layer(cors_layer()).layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(API_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

/// `get` also routes HEAD; the record endpoint only serves the verbs it lists.
async fn reject_head(request: Request, next: Next) -> Response {
    if request.method() == Method::HEAD {
        return method_not_allowed().await.into_response();
    }
    next.run(request).await
}

/// CorsLayer only sends the allow-lists on preflight; API responses carry
/// them on every status, along with the JSON content type.
async fn api_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(API_METHODS_HEADER),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static(API_METHODS_HEADER));
    }
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(%detail, "function error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal(detail)),
    )
        .into_response()
}

fn reject(err: ApiError) -> HttpError {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code = ?err.code, message = %err.message, detail = ?err.error, "request failed");
    }
    (status, Json(err))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_create_post(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>), HttpError> {
    let record = create_record(&state.api, &body).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn http_list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let records = list_records(&state.api).await.map_err(reject)?;
    Ok(Json(records))
}

async fn http_clear_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, HttpError> {
    let response = clear_records(&state.api).await.map_err(reject)?;
    Ok(Json(response))
}

async fn method_not_allowed() -> HttpError {
    reject(ApiError::method_not_allowed())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
