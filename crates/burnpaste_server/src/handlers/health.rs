//! Store liveness probe.

use super::blocking;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Report whether the record store is reachable.
///
/// Returns 200 `{"ok": true}` when it is and 503 `{"ok": false}` otherwise.
/// An unreachable store is reported as 503 Service Unavailable rather than a
/// generic 500, matching how every other endpoint maps store outages.
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.service.clone();
    match blocking(move || service.ping()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(err) => {
            tracing::warn!("Health check failed: {:?}", err);
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false })))
        }
    }
}
