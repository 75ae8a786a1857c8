//! Log viewing API backed by the in-memory capture layer.

use axum::extract::Query;
use serde::Deserialize;
use serde_json::json;

use super::{ApiResult, ok_json};
use crate::services::log_buffer::LogBuffer;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
    /// Minimum level, e.g. `warn`.
    pub level: Option<String>,
}

/// GET /api/logs
pub async fn get_logs(Query(q): Query<LogQuery>) -> ApiResult {
    let limit = q.limit.unwrap_or(100);
    let level = q.level.as_deref().and_then(|l| l.parse().ok());
    let logs = LogBuffer::global().recent(limit, level);
    Ok(ok_json(json!({
        "logs": logs,
        "count": logs.len(),
        "limit": limit,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// POST /api/logs/clear
pub async fn clear_logs() -> ApiResult {
    let cleared = LogBuffer::global().clear();
    Ok(ok_json(json!({ "cleared": cleared })))
}
