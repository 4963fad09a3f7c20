//! Operational HTTP endpoints plus the demo routes.
//!
//! - ping / healthcheck / threads : liveness-style probes
//! - metrics : JSON dump of the registry snapshot
//! - `/echo/:status` : answers with the given status (demo traffic)
//! - `/slow/:ms` : sleeps, then answers 200 (demo latency)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};

use respmeter_core::StatusCapture;

use crate::app_state::AppState;

pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    if state.metrics().is_initialized() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "metrics not initialized")
    }
}

pub async fn threads() -> impl IntoResponse {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (StatusCode::OK, format!("available_parallelism {workers}\n"))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let snapshot = state.registry().snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(body) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "metrics snapshot serialization failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn echo(
    Path(status): Path<u16>,
    capture: Option<Extension<Arc<StatusCapture>>>,
) -> Response {
    let Ok(code) = StatusCode::from_u16(status) else {
        return (StatusCode::BAD_REQUEST, "status out of range").into_response();
    };
    // The middleware replaces this with the returned status on completion.
    if let Some(Extension(capture)) = capture {
        capture.set_status(i32::from(status));
    }
    code.into_response()
}

pub async fn slow(Path(ms): Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    (StatusCode::OK, "done")
}
