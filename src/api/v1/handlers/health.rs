/*
 * Responsibility
 * - GET /health (疎通用、認証なし)
 * - filter は通るが gate は Public なので token の有無に関係なく 200
 */
use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
