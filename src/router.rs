//! Request routing: (kind, category) to provider, driven by a data table

use crate::config::RoutingConfig;
use crate::types::{AssetRequest, ProviderId};

/// Maps asset requests to the provider responsible for them
///
/// Selection is a pure function of the request's kind and category over the
/// [`RoutingConfig`] table: an explicit category match wins, otherwise the
/// kind's fallback applies, otherwise the request is unsupported. Extending
/// routing is a configuration change, not a dispatch-code change.
#[derive(Clone, Debug)]
pub struct Router {
    routing: RoutingConfig,
}

impl Router {
    /// Build a router over a routing table
    pub fn new(routing: RoutingConfig) -> Self {
        Self { routing }
    }

    /// Select the provider for a request
    ///
    /// Returns `None` when no provider is routed for the request's kind and
    /// category; the orchestrator records such requests as skipped.
    pub fn select(&self, request: &AssetRequest) -> Option<ProviderId> {
        let routes = self.routing.for_kind(request.kind);
        routes
            .categories
            .get(&request.category)
            .copied()
            .or(routes.fallback)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetKind;

    fn request(kind: AssetKind, category: &str) -> AssetRequest {
        serde_json::from_value(serde_json::json!({
            "prompt": "test prompt",
            "type": kind,
            "category": category,
        }))
        .unwrap()
    }

    #[test]
    fn test_image_category_table() {
        let router = Router::new(RoutingConfig::default());

        let cases = [
            ("sprite", ProviderId::NanoBanana),
            ("character", ProviderId::NanoBanana),
            ("background", ProviderId::Stability),
            ("environment", ProviderId::Stability),
            ("ui", ProviderId::Midjourney),
            ("icon", ProviderId::Midjourney),
        ];
        for (category, expected) in cases {
            assert_eq!(
                router.select(&request(AssetKind::Image, category)),
                Some(expected),
                "category '{category}'"
            );
        }
    }

    #[test]
    fn test_image_unknown_category_falls_back_to_diffusion() {
        let router = Router::new(RoutingConfig::default());
        assert_eq!(
            router.select(&request(AssetKind::Image, "tileset")),
            Some(ProviderId::Stability)
        );
    }

    #[test]
    fn test_volumetric_is_unsupported() {
        let router = Router::new(RoutingConfig::default());
        assert_eq!(router.select(&request(AssetKind::Volumetric, "prop")), None);
    }

    #[test]
    fn test_audio_routes_to_elevenlabs() {
        let router = Router::new(RoutingConfig::default());
        assert_eq!(
            router.select(&request(AssetKind::Audio, "sfx")),
            Some(ProviderId::ElevenLabs)
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        let router = Router::new(RoutingConfig::default());
        let req = request(AssetKind::Image, "background");
        let first = router.select(&req);
        for _ in 0..10 {
            assert_eq!(router.select(&req), first);
        }
    }

    #[test]
    fn test_extended_table_without_code_changes() {
        let mut routing = RoutingConfig::default();
        routing
            .volumetric
            .categories
            .insert("prop".to_string(), ProviderId::Stability);

        let router = Router::new(routing);
        assert_eq!(
            router.select(&request(AssetKind::Volumetric, "prop")),
            Some(ProviderId::Stability)
        );
        // Other volumetric categories remain unsupported
        assert_eq!(
            router.select(&request(AssetKind::Volumetric, "terrain")),
            None
        );
    }
}
