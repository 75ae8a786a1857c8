//! Single-shot generation API:
//!   POST /api/payload        – intent JSON → payload string
//!   POST /api/qr             – multipart `request` JSON + optional `logo` → image
//!   POST /api/qr/svg         – request JSON → SVG
//!   GET  /api/qr/remote-url  – remote image URL for a payload

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::Response;
use qr_image::crop_to_square;
use qr_image::encode::encode_image;
use qr_payload::Intent;
use qr_store::StoredSettings;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, ApiResult, err_json, ok_json};
use crate::app::SharedState;
use crate::services::generator::{GenerateError, GenerateRequest, render_settings};

fn gen_err(e: GenerateError) -> ApiError {
    err_json(e.status_code(), &e.to_string())
}

/// POST /api/payload
pub async fn encode_payload(Json(intent): Json<Intent>) -> ApiResult {
    let payload = intent.encode().map_err(|e| err_json(400, &e.to_string()))?;
    Ok(ok_json(json!({
        "type": intent.kind().as_str(),
        "payload": payload,
    })))
}

/// POST /api/qr
pub async fn generate(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut request: Option<GenerateRequest> = None;
    let mut logo: Option<Vec<u8>> = None;
    let mut crop_logo = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| err_json(400, &e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "request" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                request = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| err_json(400, &format!("Invalid request: {e}")))?,
                );
            }
            "logo" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                if !data.is_empty() {
                    logo = Some(data.to_vec());
                }
            }
            "cropLogo" => {
                let text = field.text().await.unwrap_or_default();
                crop_logo = text == "true";
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let request = request.ok_or_else(|| err_json(400, "No request provided"))?;

    if crop_logo {
        if let Some(bytes) = logo.take() {
            logo = Some(square_logo(bytes));
        }
    }

    let image = state
        .generator()
        .generate(request, logo)
        .await
        .map_err(gen_err)?;

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, image.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"qr-code.{}\"", image.extension),
        )
        .header("X-QR-Logo-Applied", image.logo_applied.to_string());
    if let Some(id) = &image.history_id {
        builder = builder.header("X-QR-History-Id", id.as_str());
    }
    builder
        .body(Body::from(image.bytes))
        .map_err(|e| err_json(500, &e.to_string()))
}

/// Crop an uploaded logo to a centered square PNG. Undecodable bytes are
/// passed through so the compositor can report them.
fn square_logo(bytes: Vec<u8>) -> Vec<u8> {
    match crop_to_square(&bytes)
        .and_then(|img| encode_image(&img, qr_image::OutputFormat::Png, 1.0))
    {
        Ok(cropped) => cropped,
        Err(e) => {
            tracing::warn!(error = %e, "Logo crop failed, using original upload");
            bytes
        }
    }
}

/// POST /api/qr/svg
pub async fn generate_svg(
    State(state): State<SharedState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let generator = state.generator();
    let (svg, payload) = generator.render_svg(&request).map_err(gen_err)?;
    if request.save_to_history {
        generator.record(&request, payload.as_str(), None);
    }

    Response::builder()
        .header(header::CONTENT_TYPE, "image/svg+xml")
        .body(Body::from(svg))
        .map_err(|e| err_json(500, &e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUrlQuery {
    pub data: String,
    pub size: Option<u32>,
    pub margin: Option<u32>,
    pub ecc: Option<String>,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
}

/// GET /api/qr/remote-url
pub async fn remote_url(
    State(state): State<SharedState>,
    Query(q): Query<RemoteUrlQuery>,
) -> Result<Json<Value>, ApiError> {
    if q.data.trim().is_empty() {
        return Err(err_json(400, "data cannot be empty"));
    }

    let (default_size, default_margin) = {
        let config = state.config().await;
        (config.default_size, config.default_margin)
    };
    let defaults = StoredSettings::default();
    let settings = StoredSettings {
        size: q.size.unwrap_or(default_size),
        margin: q.margin.unwrap_or(default_margin),
        error_correction: q.ecc.unwrap_or(defaults.error_correction),
        foreground_color: q.foreground_color.unwrap_or(defaults.foreground_color),
        background_color: q.background_color.unwrap_or(defaults.background_color),
    };
    let render = render_settings(&settings).map_err(gen_err)?;
    let url = state
        .generator()
        .remote()
        .build_url(&q.data, settings.size, &render)
        .map_err(gen_err)?;

    Ok(ok_json(json!({ "url": url })))
}
