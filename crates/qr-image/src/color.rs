//! Hex color parsing for renderers.

use std::fmt;
use std::sync::LazyLock;

use image::Rgba;
use regex::Regex;

static RE_HEX6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$").unwrap());
static RE_HEX_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// Numeric color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque RGBA pixel.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// `r-g-b` form used by the remote image service.
    pub fn to_dash_triple(self) -> String {
        format!("{}-{}-{}", self.r, self.g, self.b)
    }

    /// `#rrggbb` form used in SVG output.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse a 6-digit hex color, with or without a leading `#`.
pub fn parse_hex(hex: &str) -> Result<Rgb, ColorError> {
    let caps = RE_HEX6
        .captures(hex)
        .ok_or_else(|| ColorError::InvalidHex(hex.to_string()))?;
    let channel = |i: usize| {
        u8::from_str_radix(&caps[i], 16)
            .map_err(|_| ColorError::InvalidHex(hex.to_string()))
    };
    Ok(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

/// Whether the value looks like a 3- or 6-digit hex color.
pub fn is_valid_hex(hex: &str) -> bool {
    RE_HEX_ANY.is_match(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(parse_hex("#1f2937").unwrap(), Rgb::new(31, 41, 55));
        assert_eq!(parse_hex("FFFFFF").unwrap(), Rgb::WHITE);
        assert_eq!(parse_hex("#AbCdEf").unwrap(), Rgb::new(171, 205, 239));
    }

    #[test]
    fn rejects_short_and_garbage_values() {
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("").is_err());
        assert!(parse_hex("#12345g").is_err());
        assert!(parse_hex("##123456").is_err());
    }

    #[test]
    fn dash_triple_and_hex_forms() {
        let c = parse_hex("#059669").unwrap();
        assert_eq!(c.to_dash_triple(), "5-150-105");
        assert_eq!(c.to_hex(), "#059669");
        assert_eq!(c.to_rgba(), Rgba([5, 150, 105, 255]));
    }

    #[test]
    fn validity_accepts_three_digit_shorthand() {
        assert!(is_valid_hex("#fff"));
        assert!(is_valid_hex("a1b2c3"));
        assert!(!is_valid_hex("#ffff"));
        assert!(!is_valid_hex("blue"));
    }
}
