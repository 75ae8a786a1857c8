//! Encoding rendered images to downloadable formats.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageError, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raster output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}

/// Map a `0.0..=1.0` quality to the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 90;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode an image into the given format.
///
/// `quality` only affects JPEG; PNG and WebP are written lossless.
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: f32,
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();

    match format {
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = img.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            rgb.write_with_encoder(encoder)?;
        }
        OutputFormat::Webp => {
            let rgba = img.to_rgba8();
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
        }
    }

    debug!(
        format = format.extension(),
        width = img.width(),
        height = img.height(),
        bytes = buf.len(),
        "Encoded image"
    );
    Ok(buf)
}
