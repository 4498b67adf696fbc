//! Audio generation client
//!
//! Audio synthesis is not wired up yet: sound-effect and music generation
//! need different endpoints than the service's voice API, and that mapping
//! has not been designed. Until then the client reports itself as
//! unimplemented without issuing any network call, which the orchestrator
//! records as a skip rather than a failure.

use async_trait::async_trait;

use super::{ProviderClient, ProviderOutput};
use crate::error::{ProviderError, Result};
use crate::types::{AssetRequest, ProviderId};

/// Placeholder client for the audio service
#[derive(Clone, Copy, Debug, Default)]
pub struct ElevenLabsClient;

impl ElevenLabsClient {
    /// Create the placeholder client
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProviderClient for ElevenLabsClient {
    fn id(&self) -> ProviderId {
        ProviderId::ElevenLabs
    }

    async fn generate(&self, _request: &AssetRequest) -> Result<ProviderOutput> {
        Err(ProviderError::NotImplemented {
            provider: ProviderId::ElevenLabs,
        }
        .into())
    }
}
