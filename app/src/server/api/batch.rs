//! Batch API:
//!   POST /api/batch                  – run a batch (one at a time)
//!   POST /api/batch/parse            – CSV text → items
//!   GET  /api/batch/sample           – sample CSV
//!   GET  /api/batch/download/{file}  – download a finished archive

use std::sync::LazyLock;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiResult, err_json, ok_json};
use crate::app::SharedState;
use crate::services::batch::{BatchRequest, run_batch};

static RE_ARCHIVE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^qr-codes-batch-[0-9T\-]+-[0-9a-z]{9}\.zip$").unwrap());

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub csv: String,
}

/// POST /api/batch/parse
pub async fn parse(Json(body): Json<ParseRequest>) -> ApiResult {
    let items = qr_batch::parse_csv(&body.csv);
    Ok(ok_json(json!({ "count": items.len(), "items": items })))
}

/// GET /api/batch/sample
pub async fn sample() -> Result<Response, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"qr-batch-sample.csv\"",
        )
        .body(Body::from(qr_batch::sample_csv()))
        .map_err(|e| err_json(500, &e.to_string()))
}

/// POST /api/batch
pub async fn run(State(state): State<SharedState>, Json(body): Json<BatchRequest>) -> ApiResult {
    let Some(slot) = state.try_begin_batch() else {
        return Err(err_json(409, "A batch run is already in progress"));
    };

    let summary = run_batch(&state, body, slot)
        .await
        .map_err(|e| err_json(e.status_code(), &e.to_string()))?;
    Ok(ok_json(json!(summary)))
}

/// GET /api/batch/download/{file}
pub async fn download(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    if !RE_ARCHIVE_NAME.is_match(&file) {
        return Err(err_json(400, "Invalid archive name"));
    }

    let path = state.output_dir().join(&file);
    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| err_json(404, "Archive not found"))?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file}\""),
        )
        .body(Body::from(data))
        .map_err(|e| err_json(500, &e.to_string()))
}
