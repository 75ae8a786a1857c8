//! Single-shot QR generation: encode an intent, render it locally or fetch
//! it from the remote API, and record the result in history.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use qr_image::resize::scale_symbol;
use qr_image::{
    ColorError, EcLevel, OutputFormat, QrSymbolEncoder, RenderError, RenderSettings,
    SymbolEncoder, composite, encode_image,
};
use qr_payload::{EncodablePayload, Intent, ValidationError};
use qr_store::{Database, NewHistoryEntry, StoredSettings};
use serde::Deserialize;

use super::remote::RemoteQrClient;
use crate::config::validation::validate_generator_settings;

/// Larger images are stored in history without a preview.
const PREVIEW_MAX_BYTES: usize = 256 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Color(#[from] ColorError),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Failed to generate image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("{0}")]
    Fetch(String),

    #[error("Generation task failed: {0}")]
    Task(String),
}

impl GenerateError {
    /// HTTP status used when the error is returned from an API handler.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Color(_) | Self::InvalidSettings(_) => 400,
            Self::Render(RenderError::EmptyPayload | RenderError::Color(_)) => 400,
            Self::Render(_) => 422,
            Self::Fetch(_) => 502,
            Self::Encode(_) | Self::Task(_) => 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub intent: Intent,
    #[serde(default)]
    pub settings: StoredSettings,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_quality")]
    pub quality: f32,
    #[serde(default)]
    pub source: ImageSource,
    #[serde(default = "default_true")]
    pub save_to_history: bool,
}

fn default_quality() -> f32 {
    0.9
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub payload: EncodablePayload,
    pub logo_applied: bool,
    pub history_id: Option<String>,
}

/// Convert stored generator settings into render settings.
pub fn render_settings(settings: &StoredSettings) -> Result<RenderSettings, GenerateError> {
    validate_generator_settings(settings).map_err(GenerateError::InvalidSettings)?;
    let error_correction = match settings.error_correction.as_str() {
        "L" => EcLevel::L,
        "Q" => EcLevel::Q,
        "H" => EcLevel::H,
        _ => EcLevel::M,
    };
    Ok(RenderSettings {
        margin_modules: settings.margin,
        error_correction,
        foreground: settings.foreground_color.clone(),
        background: settings.background_color.clone(),
        ..RenderSettings::default()
    })
}

#[derive(Clone)]
pub struct GeneratorService {
    encoder: QrSymbolEncoder,
    remote: RemoteQrClient,
    db: Database,
}

impl GeneratorService {
    pub fn new(remote: RemoteQrClient, db: Database) -> Self {
        Self {
            encoder: QrSymbolEncoder::new(),
            remote,
            db,
        }
    }

    pub fn remote(&self) -> &RemoteQrClient {
        &self.remote
    }

    /// Render a raster image locally, compositing `logo` when given.
    pub fn render_raster(
        &self,
        req: &GenerateRequest,
        logo: Option<&[u8]>,
    ) -> Result<GeneratedImage, GenerateError> {
        let payload = req.intent.encode()?;
        let render = render_settings(&req.settings)?;
        let size = req.settings.size;

        let base = self.encoder.render(payload.as_str(), &render)?;
        let (image, logo_applied) = match logo {
            Some(bytes) => {
                let composed = composite(&base, Some(bytes), size);
                (composed.image, composed.logo_applied)
            }
            None => (scale_symbol(&base, size), false),
        };
        let bytes = encode_image(&DynamicImage::ImageRgba8(image), req.format, req.quality)?;

        Ok(GeneratedImage {
            bytes,
            mime_type: req.format.mime_type(),
            extension: req.format.extension(),
            payload,
            logo_applied,
            history_id: None,
        })
    }

    /// Render SVG markup locally. Logos are not supported for SVG output.
    pub fn render_svg(
        &self,
        req: &GenerateRequest,
    ) -> Result<(String, EncodablePayload), GenerateError> {
        let payload = req.intent.encode()?;
        let mut render = render_settings(&req.settings)?;
        // One unit per module; the caller scales the SVG.
        render.module_size_px = 1;
        let svg = self.encoder.render_svg(payload.as_str(), &render)?;
        Ok((svg, payload))
    }

    /// Remote image URL for the request, without fetching it.
    pub fn remote_url(&self, req: &GenerateRequest) -> Result<String, GenerateError> {
        let payload = req.intent.encode()?;
        let render = render_settings(&req.settings)?;
        self.remote
            .build_url(payload.as_str(), req.settings.size, &render)
    }

    /// Generate an image from the configured source and record it in history.
    pub async fn generate(
        &self,
        req: GenerateRequest,
        logo: Option<Vec<u8>>,
    ) -> Result<GeneratedImage, GenerateError> {
        let mut image = match req.source {
            ImageSource::Local => {
                let svc = self.clone();
                let req = req.clone();
                tokio::task::spawn_blocking(move || svc.render_raster(&req, logo.as_deref()))
                    .await
                    .map_err(|e| GenerateError::Task(e.to_string()))??
            }
            ImageSource::Remote => {
                if logo.is_some() {
                    tracing::debug!("Logo ignored for remote generation");
                }
                self.fetch_remote(&req).await?
            }
        };

        if req.save_to_history {
            let preview = match req.source {
                ImageSource::Local if image.bytes.len() <= PREVIEW_MAX_BYTES => Some(format!(
                    "data:{};base64,{}",
                    image.mime_type,
                    BASE64.encode(&image.bytes)
                )),
                ImageSource::Local => None,
                ImageSource::Remote => self.remote_url(&req).ok(),
            };
            image.history_id = self.record(&req, image.payload.as_str(), preview);
        }

        tracing::info!(
            kind = req.intent.kind().as_str(),
            source = ?req.source,
            bytes = image.bytes.len(),
            logo = image.logo_applied,
            "Generated QR code"
        );
        Ok(image)
    }

    async fn fetch_remote(&self, req: &GenerateRequest) -> Result<GeneratedImage, GenerateError> {
        let payload = req.intent.encode()?;
        let url = self.remote_url(req)?;
        let bytes = self.remote.fetch(&url).await?;

        let (mime_type, extension) = match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Jpeg) => ("image/jpeg", "jpg"),
            Ok(image::ImageFormat::WebP) => ("image/webp", "webp"),
            Ok(image::ImageFormat::Gif) => ("image/gif", "gif"),
            _ => ("image/png", "png"),
        };

        Ok(GeneratedImage {
            bytes,
            mime_type,
            extension,
            payload,
            logo_applied: false,
            history_id: None,
        })
    }

    /// Save a history entry. Failures are logged, never returned.
    pub fn record(
        &self,
        req: &GenerateRequest,
        payload: &str,
        preview: Option<String>,
    ) -> Option<String> {
        let entry = NewHistoryEntry {
            kind: req.intent.kind().as_str().to_string(),
            payload: payload.to_string(),
            settings: req.settings.clone(),
            preview,
        };
        match self.db.save_history(entry) {
            Ok(saved) => Some(saved.id),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save history entry");
                None
            }
        }
    }
}
