//! Fast low-latency image synthesis client
//!
//! Single-call protocol: one POST, image bytes returned inline as base64.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use super::{ProviderClient, ProviderOutput};
use crate::config::ServiceConfig;
use crate::error::{ProviderError, Result};
use crate::types::{AssetRequest, ProviderId};

/// Client for the fast synthesis service
pub struct NanoBananaClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl NanoBananaClient {
    /// Create a client from service configuration
    pub fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    image: String,
}

#[async_trait]
impl ProviderClient for NanoBananaClient {
    fn id(&self) -> ProviderId {
        ProviderId::NanoBanana
    }

    async fn generate(&self, request: &AssetRequest) -> Result<ProviderOutput> {
        let payload = serde_json::json!({
            "prompt": format!(
                "{}, {} style, game asset, clean background",
                request.prompt, request.style
            ),
            "width": request.width,
            "height": request.height,
            "steps": 30,
            "guidance_scale": 7.5,
            "format": "png",
        });

        let response = self
            .http
            .post(format!("{}/generate", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: self.id(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let body: GenerateResponse = response.json().await?;
        let bytes = BASE64.decode(&body.image).map_err(|e| ProviderError::Decode {
            provider: self.id(),
            reason: e.to_string(),
        })?;

        Ok(ProviderOutput {
            bytes,
            format: "png".to_string(),
        })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::test_helpers::{image_request, test_service};
    use base64::Engine as _;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_decodes_inline_image() {
        let server = MockServer::start().await;
        let image_bytes = b"fake png bytes".to_vec();
        let encoded = BASE64.encode(&image_bytes);

        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "neon alley, cyberpunk style, game asset, clean background",
                "width": 512,
                "height": 512,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "image": encoded })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = NanoBananaClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let output = client.generate(&image_request("sprite")).await.unwrap();

        assert_eq!(output.bytes, image_bytes);
        assert_eq!(output.format, "png");
    }

    #[tokio::test]
    async fn test_non_success_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = NanoBananaClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let err = client.generate(&image_request("sprite")).await.unwrap_err();

        match err {
            Error::Provider(ProviderError::Status { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_base64_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "image": "%%not-base64%%" })),
            )
            .mount(&server)
            .await;

        let client = NanoBananaClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let err = client.generate(&image_request("sprite")).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Provider(ProviderError::Decode { .. })
        ));
    }
}
