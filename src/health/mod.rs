//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// Fixed success payload; the relay has no dependencies worth probing.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
