//! Runtime application configuration loaded from the environment.

use serde::Serialize;

use super::validation::validate_setting;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REMOTE_API_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_SIZE: u32 = 256;
pub const DEFAULT_MARGIN: u32 = 4;
pub const DEFAULT_BATCH_MAX_ITEMS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub server_port: u16,
    pub remote_api_url: String,
    pub default_size: u32,
    pub default_margin: u32,
    pub batch_max_items: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            remote_api_url: DEFAULT_REMOTE_API_URL.into(),
            default_size: DEFAULT_SIZE,
            default_margin: DEFAULT_MARGIN,
            batch_max_items: DEFAULT_BATCH_MAX_ITEMS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup. Missing, unparsable or invalid
    /// values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            match validate_setting(key, value) {
                Ok(()) => Some(value.to_string()),
                Err(e) => {
                    tracing::warn!(key, value, "Ignoring invalid setting: {e}");
                    None
                }
            }
        };
        let defaults = Self::default();

        Self {
            server_port: parse_or(g("QR_STUDIO_PORT"), defaults.server_port),
            remote_api_url: g("QR_REMOTE_API_URL").unwrap_or(defaults.remote_api_url),
            default_size: parse_or(g("QR_DEFAULT_SIZE"), defaults.default_size),
            default_margin: parse_or(g("QR_DEFAULT_MARGIN"), defaults.default_margin),
            batch_max_items: parse_or(g("QR_BATCH_MAX_ITEMS"), defaults.batch_max_items),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
