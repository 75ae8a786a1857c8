//! Settings API:
//!   GET /api/settings  – runtime config + last generator settings
//!   PUT /api/settings  – persist generator settings

use axum::Json;
use axum::extract::State;
use qr_store::StoredSettings;
use serde_json::json;

use super::{ApiResult, db_err, err_json, ok_json};
use crate::app::SharedState;
use crate::config::validation::validate_generator_settings;

pub const GENERATOR_SETTINGS_KEY: &str = "generator_settings";

/// Stored generator settings, or defaults taken from the runtime config.
async fn generator_settings(state: &SharedState) -> Result<StoredSettings, qr_store::DbError> {
    match state.db().get_json_setting(GENERATOR_SETTINGS_KEY) {
        Ok(Some(settings)) => return Ok(settings),
        Ok(None) => {}
        Err(qr_store::DbError::Json(e)) => {
            tracing::warn!(error = %e, "Stored generator settings unreadable, using defaults")
        }
        Err(e) => return Err(e),
    }

    let config = state.config().await;
    Ok(StoredSettings {
        size: config.default_size,
        margin: config.default_margin,
        ..StoredSettings::default()
    })
}

/// GET /api/settings
pub async fn get_settings(State(state): State<SharedState>) -> ApiResult {
    let generator = generator_settings(&state).await.map_err(db_err)?;
    let config = state.config().await.clone();
    Ok(ok_json(json!({
        "config": config,
        "generator": generator,
    })))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<StoredSettings>,
) -> ApiResult {
    validate_generator_settings(&body).map_err(|e| err_json(400, &e))?;
    state
        .db()
        .set_json_setting(GENERATOR_SETTINGS_KEY, &body)
        .map_err(db_err)?;
    Ok(ok_json(json!({ "generator": body })))
}
