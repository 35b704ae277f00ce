use crate::domain::model::QrRequest;
use crate::domain::ports::QrRenderer;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

fn build_url(endpoint: &str, request: &QrRequest) -> Result<String> {
    let size = format!("{}x{}", request.size, request.size);
    let url = Url::parse_with_params(
        endpoint,
        &[
            ("data", request.data.as_str()),
            ("size", size.as_str()),
            ("ecc", &request.ecc.to_string()),
            ("margin", &request.margin.to_string()),
            ("format", "png"),
        ],
    )
    .map_err(|e| CalcError::InvalidConfigValueError {
        field: "qr.endpoint".to_string(),
        value: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url.to_string())
}

/// Fetches PNG renders from a qrserver-compatible endpoint.
pub struct HttpQrRenderer {
    client: Client,
    endpoint: String,
}

impl HttpQrRenderer {
    pub fn new(endpoint: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl QrRenderer for HttpQrRenderer {
    fn image_url(&self, request: &QrRequest) -> Result<String> {
        build_url(&self.endpoint, request)
    }

    async fn render(&self, request: &QrRequest) -> Result<Vec<u8>> {
        let url = self.image_url(request)?;
        tracing::debug!("Requesting QR image: {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CalcError::RemoteError {
                message: format!("QR endpoint returned {}", response.status()),
            });
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Offline mode: links can still be built but nothing is fetched.
pub struct UnavailableQrRenderer {
    endpoint: String,
}

impl UnavailableQrRenderer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for UnavailableQrRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_QR_ENDPOINT)
    }
}

#[async_trait]
impl QrRenderer for UnavailableQrRenderer {
    fn image_url(&self, request: &QrRequest) -> Result<String> {
        build_url(&self.endpoint, request)
    }

    async fn render(&self, _request: &QrRequest) -> Result<Vec<u8>> {
        Err(CalcError::RemoteError {
            message: "offline mode".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_data() {
        let request = QrRequest {
            data: "https://example.com/?a=1&b=two words".to_string(),
            size: 240,
            margin: 4,
            ecc: 'Q',
        };
        let url = build_url(DEFAULT_QR_ENDPOINT, &request).unwrap();
        assert!(url.starts_with("https://api.qrserver.com/v1/create-qr-code/?data="));
        assert!(url.contains("size=240x240"));
        assert!(url.contains("ecc=Q"));
        assert!(url.contains("margin=4"));
        assert!(url.contains("format=png"));
        assert!(!url.contains("two words"));
    }
}
