//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

use qr_image::parse_hex;
use qr_store::StoredSettings;

static RE_HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").unwrap());

pub const MIN_SIZE: u32 = 32;
pub const MAX_SIZE: u32 = 2048;
pub const MAX_MARGIN: u32 = 20;

/// Validate an environment setting. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "QR_STUDIO_PORT" => {
            let v: u16 = value.parse().map_err(|_| "must be a port number")?;
            if v == 0 {
                return Err("must be between 1 and 65535".into());
            }
        }
        "QR_REMOTE_API_URL" => {
            if !RE_HTTP_URL.is_match(value) {
                return Err("must be an http(s) URL".into());
            }
        }
        "QR_DEFAULT_SIZE" => validate_int_range(value, MIN_SIZE, MAX_SIZE)?,
        "QR_DEFAULT_MARGIN" => validate_int_range(value, 0, MAX_MARGIN)?,
        "QR_BATCH_MAX_ITEMS" => validate_int_range(value, 1, 10_000)?,
        _ => {}
    }
    Ok(())
}

/// Validate generator settings before they are persisted.
pub fn validate_generator_settings(settings: &StoredSettings) -> Result<(), String> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&settings.size) {
        return Err(format!("size must be between {MIN_SIZE} and {MAX_SIZE}"));
    }
    if settings.margin > MAX_MARGIN {
        return Err(format!("margin must be between 0 and {MAX_MARGIN}"));
    }
    if !matches!(settings.error_correction.as_str(), "L" | "M" | "Q" | "H") {
        return Err("errorCorrection must be one of L, M, Q, H".into());
    }
    for (name, color) in [
        ("foregroundColor", &settings.foreground_color),
        ("backgroundColor", &settings.background_color),
    ] {
        if parse_hex(color).is_err() {
            return Err(format!("{name} must be a 6-digit hex color"));
        }
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u32, max: u32) -> Result<(), String> {
    let v: u32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_port() {
        assert!(validate_setting("QR_STUDIO_PORT", "8080").is_ok());
        assert!(validate_setting("QR_STUDIO_PORT", "0").is_err());
        assert!(validate_setting("QR_STUDIO_PORT", "70000").is_err());
    }

    #[test]
    fn test_valid_remote_url() {
        let check = |v| validate_setting("QR_REMOTE_API_URL", v);
        assert!(check("https://api.qrserver.com/v1/create-qr-code/").is_ok());
        assert!(check("http://localhost:3000").is_ok());
        assert!(check("api.qrserver.com").is_err());
        assert!(check("https://").is_err());
    }

    #[test]
    fn test_valid_ranges() {
        assert!(validate_setting("QR_DEFAULT_SIZE", "256").is_ok());
        assert!(validate_setting("QR_DEFAULT_SIZE", "4096").is_err());
        assert!(validate_setting("QR_DEFAULT_MARGIN", "0").is_ok());
        assert!(validate_setting("QR_DEFAULT_MARGIN", "-1").is_err());
        assert!(validate_setting("UNKNOWN_KEY", "anything").is_ok());
    }

    #[test]
    fn test_generator_settings() {
        let mut settings = StoredSettings::default();
        assert!(validate_generator_settings(&settings).is_ok());

        settings.foreground_color = "1f2937".into();
        assert!(validate_generator_settings(&settings).is_ok());

        settings.foreground_color = "#abc".into();
        assert!(validate_generator_settings(&settings).is_err());

        settings.foreground_color = "red".into();
        let err = validate_generator_settings(&settings).unwrap_err();
        assert!(err.contains("foregroundColor"));

        settings.foreground_color = "#000000".into();
        settings.error_correction = "X".into();
        assert!(validate_generator_settings(&settings).is_err());
    }
}
