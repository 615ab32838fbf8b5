pub mod auth;
pub mod users;

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe. Touches nothing but the process.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
