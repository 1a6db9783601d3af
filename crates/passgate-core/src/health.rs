use axum::Json;
use serde_json::{Value, json};

/// Handler for `GET /healthz` — process liveness.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Handler for `GET /readyz` — readiness. Services whose state lives in
/// process report ready as soon as they are live.
pub async fn readyz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
