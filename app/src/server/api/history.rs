//! History API:
//!   GET    /api/history          – all entries, newest first
//!   DELETE /api/history          – clear
//!   DELETE /api/history/{id}     – delete one entry
//!   GET    /api/history/export   – JSON download
//!   POST   /api/history/import   – replace with an exported JSON array

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use serde_json::json;

use super::{ApiError, ApiResult, db_err, err_json, ok_json};
use crate::app::SharedState;

/// GET /api/history
pub async fn list(State(state): State<SharedState>) -> ApiResult {
    let history = state.db().get_history().map_err(db_err)?;
    Ok(ok_json(json!(history)))
}

/// DELETE /api/history
pub async fn clear(State(state): State<SharedState>) -> ApiResult {
    state.db().clear_history().map_err(db_err)?;
    Ok(ok_json(json!({ "message": "History cleared" })))
}

/// DELETE /api/history/{id}
pub async fn remove(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult {
    state.db().delete_history(&id).map_err(db_err)?;
    Ok(ok_json(json!({ "id": id })))
}

/// GET /api/history/export
pub async fn export(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let body = state.db().export_history().map_err(db_err)?;
    let date = chrono::Utc::now().format("%Y-%m-%d");
    let file_name = format!("qr-history-{date}.json");

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(body))
        .map_err(|e| err_json(500, &e.to_string()))
}

/// POST /api/history/import
pub async fn import(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    let text = std::str::from_utf8(&body)
        .map_err(|_| err_json(400, "Body must be UTF-8 JSON"))?;
    let count = state.db().import_history(text).map_err(db_err)?;
    tracing::info!(count, "History imported");
    Ok(ok_json(json!({ "imported": count })))
}
