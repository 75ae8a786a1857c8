//! Raster side of QR generation.
//!
//! Provides hex color parsing, a `qrcode`-backed symbol encoder with
//! custom colors and quiet zone, logo compositing, and encoding to the
//! PNG/JPEG/WebP output formats.

pub mod color;
pub mod compose;
pub mod encode;
pub mod resize;
pub mod symbol;

// Re-exports for convenience
pub use color::{ColorError, Rgb, is_valid_hex, parse_hex};
pub use compose::{CompositeImage, composite, crop_to_square};
pub use encode::{OutputFormat, encode_image};
pub use symbol::{EcLevel, QrSymbolEncoder, RenderError, RenderSettings, SymbolEncoder};

/// Default module edge length in pixels.
pub const DEFAULT_MODULE_SIZE: u32 = 8;

/// Default quiet zone width in modules.
pub const DEFAULT_MARGIN: u32 = 4;
