//! Generation provider clients
//!
//! One module per remote service, all implementing [`ProviderClient`].
//! Clients hold no state between calls beyond a shared HTTP client, so they
//! are safe for concurrent use once rate-limited.

mod elevenlabs;
mod midjourney;
mod mock;
mod nanobanana;
mod stability;

pub use elevenlabs::ElevenLabsClient;
pub use midjourney::MidjourneyClient;
pub use mock::{MockBehavior, MockProvider};
pub use nanobanana::NanoBananaClient;
pub use stability::StabilityClient;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ServicesConfig;
use crate::error::Result;
use crate::types::{AssetRequest, ProviderId};

/// Bytes produced by a provider, plus their file format extension
#[derive(Clone, Debug)]
pub struct ProviderOutput {
    /// Raw artifact bytes
    pub bytes: Vec<u8>,
    /// Format extension for the persisted file (e.g. "png")
    pub format: String,
}

/// Common contract for generation providers
///
/// Implementations build a provider-specific payload from the request,
/// attach the provider's credential, and issue one or more network calls
/// (including any polling protocol) until bytes are available or the
/// attempt fails.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Which provider this client talks to
    fn id(&self) -> ProviderId;

    /// Generate one asset, returning its raw bytes
    async fn generate(&self, request: &AssetRequest) -> Result<ProviderOutput>;
}

/// Provider lookup table used by the generation engine
pub type ProviderRegistry = HashMap<ProviderId, Arc<dyn ProviderClient>>;

/// Build the default registry: one client per configured service
pub fn build_registry(http: &reqwest::Client, services: &ServicesConfig) -> ProviderRegistry {
    let mut registry: ProviderRegistry = HashMap::new();
    registry.insert(
        ProviderId::NanoBanana,
        Arc::new(NanoBananaClient::new(http.clone(), services.nanobanana.clone())),
    );
    registry.insert(
        ProviderId::Stability,
        Arc::new(StabilityClient::new(http.clone(), services.stability.clone())),
    );
    registry.insert(
        ProviderId::Midjourney,
        Arc::new(MidjourneyClient::new(http.clone(), services.midjourney.clone())),
    );
    registry.insert(ProviderId::ElevenLabs, Arc::new(ElevenLabsClient::new()));
    registry
}
