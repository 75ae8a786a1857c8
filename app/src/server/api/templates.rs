//! Template API:
//!   GET    /api/templates       – built-ins followed by user templates
//!   POST   /api/templates       – save a user template
//!   DELETE /api/templates/{id}  – delete a user template

use axum::Json;
use axum::extract::{Path, State};
use qr_store::NewTemplate;
use serde_json::json;

use super::{ApiResult, db_err, err_json, ok_json};
use crate::app::SharedState;
use crate::config::validation::validate_generator_settings;

/// GET /api/templates
pub async fn list(State(state): State<SharedState>) -> ApiResult {
    let templates = state.db().get_templates().map_err(db_err)?;
    Ok(ok_json(json!(templates)))
}

/// POST /api/templates
pub async fn create(State(state): State<SharedState>, Json(body): Json<NewTemplate>) -> ApiResult {
    validate_generator_settings(&body.settings).map_err(|e| err_json(400, &e))?;
    let template = state.db().save_template(body).map_err(db_err)?;
    Ok(ok_json(json!(template)))
}

/// DELETE /api/templates/{id}
pub async fn remove(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult {
    state.db().delete_template(&id).map_err(db_err)?;
    Ok(ok_json(json!({ "id": id })))
}
