use std::sync::Arc;

use serde_json::{Map, Value};
use shared::{
    domain::Record,
    error::ApiError,
    protocol::{MessageResponse, CLEAR_CONFIRMATION},
};
use storage::RecordStore;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn RecordStore>,
}

impl ApiContext {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// Parses `body` as a JSON object and appends it as a new record.
pub async fn create_record(ctx: &ApiContext, body: &[u8]) -> Result<Record, ApiError> {
    let fields = parse_body(body)?;
    let record = ctx.store.create(fields).await.map_err(internal)?;
    info!(
        id = %record.id,
        fields = record.fields.len(),
        "received new post"
    );
    debug!(record = ?record, "stored post");
    Ok(record)
}

pub async fn list_records(ctx: &ApiContext) -> Result<Vec<Record>, ApiError> {
    ctx.store.list().await.map_err(internal)
}

pub async fn clear_records(ctx: &ApiContext) -> Result<MessageResponse, ApiError> {
    let removed = ctx.store.clear().await.map_err(internal)?;
    info!(removed, "all posts cleared");
    Ok(MessageResponse::new(CLEAR_CONFIRMATION))
}

fn parse_body(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(missing_body());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(Value::Null) => Err(missing_body()),
        Ok(_) | Err(_) => Err(ApiError::bad_request(
            "Request body must be a JSON object.",
        )),
    }
}

fn missing_body() -> ApiError {
    ApiError::bad_request("Request body is missing.")
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
