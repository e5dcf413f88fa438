//! HTTP handlers mapping the reference transport onto the queue engine

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::Response,
};
use serde::Deserialize;
use tracing::info;

use relayq_core::{ApiError, RequestId};

use crate::engine::{Enqueued, QueueEngine};

/// Query parameters recognized on key routes.
///
/// `v` feeds writes and `timeout` feeds reads; both are optional so a single
/// extractor serves every method.
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub v: Option<String>,
    pub timeout: Option<String>,
}

/// Handle a request for `/<key>`, dispatching on the method.
pub async fn handle_key(
    State(engine): State<Arc<QueueEngine>>,
    Path(key): Path<String>,
    method: Method,
    Query(query): Query<KeyQuery>,
) -> Response {
    dispatch(&engine, &key, method, query).await
}

/// Handle a request for the bare root, which names the empty key: writes are
/// rejected for the missing key and reads can never find anything.
pub async fn handle_root(
    State(engine): State<Arc<QueueEngine>>,
    method: Method,
    Query(query): Query<KeyQuery>,
) -> Response {
    dispatch(&engine, "", method, query).await
}

/// Report queue depth and blocked-consumer count for a key.
pub async fn handle_stats(
    State(engine): State<Arc<QueueEngine>>,
    Path(key): Path<String>,
) -> Response {
    let body = serde_json::json!({
        "depth": engine.depth(&key),
        "waiting": engine.waiting(&key),
    });
    json_response(StatusCode::OK, body.to_string(), &RequestId::new())
}

async fn dispatch(engine: &QueueEngine, key: &str, method: Method, query: KeyQuery) -> Response {
    let request_id = RequestId::new();
    match method {
        Method::PUT => handle_put(engine, key, query.v, &request_id),
        Method::GET => handle_get(engine, key, query.timeout.as_deref(), &request_id).await,
        _ => error_response(&ApiError::MethodNotSupported, &request_id),
    }
}

fn handle_put(
    engine: &QueueEngine,
    key: &str,
    value: Option<String>,
    request_id: &RequestId,
) -> Response {
    if key.is_empty() {
        return error_response(&ApiError::BadRequest("missing key".into()), request_id);
    }
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return error_response(&ApiError::BadRequest("missing value".into()), request_id),
    };

    let body = match engine.enqueue(key, value) {
        Enqueued::Delivered => {
            info!(key = %key, request_id = %request_id, "delivered to blocked consumer");
            serde_json::json!({ "delivered": true })
        }
        Enqueued::Stored { depth } => {
            info!(key = %key, depth, request_id = %request_id, "queued");
            serde_json::json!({ "queued": depth })
        }
    };
    json_response(StatusCode::CREATED, body.to_string(), request_id)
}

async fn handle_get(
    engine: &QueueEngine,
    key: &str,
    timeout: Option<&str>,
    request_id: &RequestId,
) -> Response {
    let timeout = parse_timeout(timeout);
    info!(key = %key, timeout_secs = timeout.as_secs(), request_id = %request_id, "dequeue");

    match engine.dequeue_blocking(key, timeout).await {
        Some(value) => text_response(StatusCode::OK, value, request_id),
        None => error_response(&ApiError::NotFound, request_id),
    }
}

/// Absent, unparsable, or non-positive timeouts all mean "do not block".
fn parse_timeout(raw: Option<&str>) -> Duration {
    match raw.and_then(|t| t.parse::<i64>().ok()) {
        Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
        _ => Duration::ZERO,
    }
}

// === Response helpers ===

fn text_response(status: StatusCode, body: String, request_id: &RequestId) -> Response {
    respond(status, "text/plain; charset=utf-8", body, request_id)
}

fn json_response(status: StatusCode, body: String, request_id: &RequestId) -> Response {
    respond(status, "application/json", body, request_id)
}

fn error_response(error: &ApiError, request_id: &RequestId) -> Response {
    let status = StatusCode::from_u16(error.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    respond(status, "text/plain; charset=utf-8", error.to_string(), request_id)
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: String,
    request_id: &RequestId,
) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header("x-request-id", request_id.as_str())
        .body(Body::from(body))
        .unwrap()
}
