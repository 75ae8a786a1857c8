//! QR symbol rendering with custom colors and quiet zone.

use image::RgbaImage;
use qrcode::QrCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{ColorError, Rgb, parse_hex};
use crate::{DEFAULT_MARGIN, DEFAULT_MODULE_SIZE};

/// Upper bound for the rendered side length in pixels.
pub const MAX_RENDER_SIDE: u32 = 8192;

/// Error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EcLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl EcLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Shared render parameters. Read-only for the duration of a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    pub module_size_px: u32,
    pub margin_modules: u32,
    pub error_correction: EcLevel,
    pub foreground: String,
    pub background: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            module_size_px: DEFAULT_MODULE_SIZE,
            margin_modules: DEFAULT_MARGIN,
            error_correction: EcLevel::M,
            foreground: "#000000".into(),
            background: "#ffffff".into(),
        }
    }
}

impl RenderSettings {
    /// Resolve both colors to numeric triples.
    pub fn colors(&self) -> Result<(Rgb, Rgb), ColorError> {
        Ok((parse_hex(&self.foreground)?, parse_hex(&self.background)?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No input text")]
    EmptyPayload,

    #[error("Module size must be greater than zero")]
    InvalidModuleSize,

    #[error("{0}")]
    Color(#[from] ColorError),

    #[error("QR encode error: {0}")]
    Encode(String),

    #[error("Rendered symbol too large: {side}px exceeds {max}px")]
    TooLarge { side: u32, max: u32 },
}

/// Turns a payload into a raster symbol.
pub trait SymbolEncoder {
    fn render(&self, payload: &str, settings: &RenderSettings) -> Result<RgbaImage, RenderError>;
}

/// [`SymbolEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrSymbolEncoder;

/// Module matrix plus the geometry needed to paint it.
struct Matrix {
    dark: Vec<bool>,
    width: u32,
    margin: u32,
    module: u32,
}

impl Matrix {
    fn side_modules(&self) -> u32 {
        self.width + 2 * self.margin
    }

    fn side_px(&self) -> u32 {
        self.side_modules() * self.module
    }

    fn dark_modules(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.dark.iter().enumerate().filter_map(|(i, dark)| {
            let i = i as u32;
            let x = i % self.width + self.margin;
            let y = i / self.width + self.margin;
            dark.then_some((x, y))
        })
    }
}

impl QrSymbolEncoder {
    pub fn new() -> Self {
        Self
    }

    fn matrix(&self, payload: &str, settings: &RenderSettings) -> Result<Matrix, RenderError> {
        if payload.is_empty() {
            return Err(RenderError::EmptyPayload);
        }
        if settings.module_size_px == 0 {
            return Err(RenderError::InvalidModuleSize);
        }

        let level: qrcode::EcLevel = settings.error_correction.into();
        let code = QrCode::with_error_correction_level(payload.as_bytes(), level)
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        let matrix = Matrix {
            dark: code
                .to_colors()
                .into_iter()
                .map(|c| c == qrcode::Color::Dark)
                .collect(),
            width: code.width() as u32,
            margin: settings.margin_modules,
            module: settings.module_size_px,
        };

        let side = u64::from(matrix.side_modules()) * u64::from(matrix.module);
        if side > u64::from(MAX_RENDER_SIDE) {
            return Err(RenderError::TooLarge {
                side: side.min(u64::from(u32::MAX)) as u32,
                max: MAX_RENDER_SIDE,
            });
        }
        Ok(matrix)
    }

    /// Render the payload as SVG markup with the same geometry as [`SymbolEncoder::render`].
    pub fn render_svg(
        &self,
        payload: &str,
        settings: &RenderSettings,
    ) -> Result<String, RenderError> {
        let (fg, bg) = settings.colors()?;
        let matrix = self.matrix(payload, settings)?;
        let dim = matrix.side_modules();
        let side = matrix.side_px();

        let mut path = String::new();
        for (x, y) in matrix.dark_modules() {
            path.push_str(&format!("M{x} {y}h1v1h-1z"));
        }

        Ok(format!(
            concat!(
                r#"<?xml version="1.0" standalone="yes"?>"#,
                r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" "#,
                r#"width="{side}" height="{side}" "#,
                r#"viewBox="0 0 {dim} {dim}" shape-rendering="crispEdges">"#,
                r#"<rect width="{dim}" height="{dim}" fill="{bg}"/>"#,
                r#"<path fill="{fg}" d="{path}"/></svg>"#
            ),
            side = side,
            dim = dim,
            bg = bg.to_hex(),
            fg = fg.to_hex(),
            path = path,
        ))
    }
}

impl SymbolEncoder for QrSymbolEncoder {
    fn render(&self, payload: &str, settings: &RenderSettings) -> Result<RgbaImage, RenderError> {
        let (fg, bg) = settings.colors()?;
        let matrix = self.matrix(payload, settings)?;
        let side = matrix.side_px();
        let scale = matrix.module;

        debug!(
            modules = matrix.width,
            margin = matrix.margin,
            scale,
            side,
            "Rendering QR symbol"
        );

        let mut img = RgbaImage::from_pixel(side, side, bg.to_rgba());
        let dark = fg.to_rgba();
        for (x, y) in matrix.dark_modules() {
            for dx in 0..scale {
                for dy in 0..scale {
                    img.put_pixel(x * scale + dx, y * scale + dy, dark);
                }
            }
        }

        Ok(img)
    }
}
