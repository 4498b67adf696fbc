//! High-fidelity diffusion image client
//!
//! Single-call protocol with an array-of-prompts payload; the response
//! carries an array of artifacts of which the first is used. A success
//! response with an empty artifact array is a provider failure, not a
//! silent no-op.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use super::{ProviderClient, ProviderOutput};
use crate::config::ServiceConfig;
use crate::error::{ProviderError, Result};
use crate::types::{AssetRequest, ProviderId};

const ENGINE_PATH: &str = "generation/stable-diffusion-xl-1024-v1-0/text-to-image";

/// Client for the diffusion service
pub struct StabilityClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl StabilityClient {
    /// Create a client from service configuration
    pub fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Deserialize)]
struct GenerationResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct Artifact {
    base64: String,
}

#[async_trait]
impl ProviderClient for StabilityClient {
    fn id(&self) -> ProviderId {
        ProviderId::Stability
    }

    async fn generate(&self, request: &AssetRequest) -> Result<ProviderOutput> {
        let payload = serde_json::json!({
            "text_prompts": [{
                "text": format!(
                    "{}, {} aesthetic, game environment, high quality",
                    request.prompt, request.style
                ),
                "weight": 1.0,
            }],
            "cfg_scale": 7,
            "clip_guidance_preset": "FAST_BLUE",
            "height": request.height,
            "width": request.width,
            "samples": 1,
            "steps": 30,
        });

        let response = self
            .http
            .post(format!("{}/{}", self.config.base_url, ENGINE_PATH))
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
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

        let body: GenerationResponse = response.json().await?;
        let first = body.artifacts.first().ok_or(ProviderError::Empty {
            provider: ProviderId::Stability,
        })?;

        let bytes = BASE64
            .decode(&first.base64)
            .map_err(|e| ProviderError::Decode {
                provider: ProviderId::Stability,
                reason: e.to_string(),
            })?;

        Ok(ProviderOutput {
            bytes,
            format: "png".to_string(),
        })
    }
}
