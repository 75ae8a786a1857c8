//! Client for a qrserver.com-compatible remote image API.

use std::time::Duration;

use qr_image::RenderSettings;
use reqwest::Url;

use super::generator::GenerateError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct RemoteQrClient {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteQrClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the image URL for a payload.
    ///
    /// Colors are sent as `r-g-b` decimal triples and the size as `WxH`.
    pub fn build_url(
        &self,
        payload: &str,
        size: u32,
        settings: &RenderSettings,
    ) -> Result<String, GenerateError> {
        let (fg, bg) = settings.colors()?;
        let size = format!("{size}x{size}");
        let margin = settings.margin_modules.to_string();
        let color = fg.to_dash_triple();
        let bgcolor = bg.to_dash_triple();
        let params = [
            ("data", payload),
            ("size", size.as_str()),
            ("margin", margin.as_str()),
            ("ecc", settings.error_correction.as_str()),
            ("color", color.as_str()),
            ("bgcolor", bgcolor.as_str()),
        ];
        match Url::parse_with_params(&self.base_url, params) {
            Ok(url) => Ok(url.into()),
            Err(e) => {
                let msg = format!("remote API URL: {e}");
                Err(GenerateError::InvalidSettings(msg))
            }
        }
    }

    /// Download the image behind `url`.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, GenerateError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(error = %e, "Remote QR request failed");
                GenerateError::Fetch("Failed to fetch image".into())
            })?;

        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "Remote QR body could not be read");
            GenerateError::Fetch("Failed to fetch image".into())
        })?;
        tracing::debug!(bytes = bytes.len(), "Fetched remote QR image");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qr_image::EcLevel;

    fn client() -> RemoteQrClient {
        RemoteQrClient::new("https://api.qrserver.com/v1/create-qr-code/")
    }

    #[test]
    fn builds_query_in_order() {
        let settings = RenderSettings {
            margin_modules: 2,
            error_correction: EcLevel::H,
            foreground: "#1f2937".into(),
            background: "ffffff".into(),
            ..RenderSettings::default()
        };
        let url = client().build_url("hello", 300, &settings).unwrap();
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?data=hello&size=300x300&margin=2&ecc=H&color=31-41-55&bgcolor=255-255-255"
        );
    }

    #[test]
    fn escapes_payload() {
        let payload = "WIFI:T:WPA2;S:Home;P:a&b;H:false;;";
        let url = client()
            .build_url(payload, 256, &RenderSettings::default())
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let data = parsed
            .query_pairs()
            .find(|(k, _)| k == "data")
            .map(|(_, v)| v.into_owned());
        assert_eq!(data.as_deref(), Some(payload));
    }

    #[test]
    fn invalid_color_is_rejected() {
        let settings = RenderSettings {
            foreground: "nope".into(),
            ..RenderSettings::default()
        };
        let err = client().build_url("x", 256, &settings).unwrap_err();
        assert!(matches!(err, GenerateError::Color(_)));
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = RemoteQrClient::new("not a url")
            .build_url("x", 256, &RenderSettings::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidSettings(_)));
    }
}
