//! REST API handlers grouped by domain.

pub mod batch;
pub mod history;
pub mod logs;
pub mod qr;
pub mod settings;
pub mod templates;

use axum::Json;
use axum::http::StatusCode;
use qr_store::DbError;
use serde_json::{Value, json};

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Standard success response.
pub fn ok_json(data: Value) -> Json<Value> {
    Json(json!({ "status": "ok", "data": data }))
}

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Map a store error to an HTTP error response.
pub fn db_err(e: DbError) -> ApiError {
    let status = match &e {
        DbError::NotFound(_) => 404,
        DbError::BuiltinTemplate(_) => 403,
        DbError::InvalidData(_) | DbError::Json(_) => 400,
        DbError::Sqlite(_) | DbError::LockPoisoned => 500,
    };
    if status == 500 {
        tracing::error!(error = %e, "Database error");
    }
    err_json(status, &e.to_string())
}
