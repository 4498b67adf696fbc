//! Scripted provider double
//!
//! A stand-in [`ProviderClient`] with a fixed outcome, used by orchestrator
//! tests and available to library consumers for dry runs. Tracks how many
//! times it was invoked.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ProviderClient, ProviderOutput};
use crate::error::{ProviderError, Result};
use crate::types::{AssetRequest, ProviderId};

/// Minimal valid-looking PNG header returned by succeeding mocks
const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Scripted outcome of a [`MockProvider`]
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Return the given bytes and format
    Succeed {
        /// Bytes handed back as the generated artifact
        bytes: Vec<u8>,
        /// Format extension reported with the bytes
        format: String,
    },
    /// Report a provider-side failure (HTTP 500 shaped)
    Fail,
    /// Behave like a provider with no implementation (skip semantics)
    NotImplemented,
}

/// Provider double with a scripted outcome and a call counter
pub struct MockProvider {
    id: ProviderId,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a mock impersonating `id` with the given behavior
    pub fn new(id: ProviderId, behavior: MockBehavior) -> Self {
        Self {
            id,
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock that succeeds with placeholder PNG bytes
    pub fn succeeding(id: ProviderId) -> Self {
        Self::new(
            id,
            MockBehavior::Succeed {
                bytes: FAKE_PNG.to_vec(),
                format: "png".to_string(),
            },
        )
    }

    /// Mock that always reports a provider failure
    pub fn failing(id: ProviderId) -> Self {
        Self::new(id, MockBehavior::Fail)
    }

    /// Mock that always reports itself unimplemented
    pub fn unimplemented(id: ProviderId) -> Self {
        Self::new(id, MockBehavior::NotImplemented)
    }

    /// Number of generate calls made against this mock
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn generate(&self, _request: &AssetRequest) -> Result<ProviderOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Succeed { bytes, format } => Ok(ProviderOutput {
                bytes: bytes.clone(),
                format: format.clone(),
            }),
            MockBehavior::Fail => Err(ProviderError::Status {
                provider: self.id,
                status: 500,
            }
            .into()),
            MockBehavior::NotImplemented => {
                Err(ProviderError::NotImplemented { provider: self.id }.into())
            }
        }
    }
}
