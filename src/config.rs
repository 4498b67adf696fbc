//! Configuration types for asset-gen

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::{AssetKind, ProviderId};

/// Per-provider service configuration
///
/// Credentials default to the provider's environment variable and are not
/// validated up front: an absent key surfaces as an authorization error on
/// the first provider call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bearer credential attached to every request
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the service API
    pub base_url: String,

    /// Outbound request quota per rolling 60-second window (must be > 0)
    pub rate_limit: u32,

    /// Seconds between job status polls, queued providers only (default: 10)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum job status polls before timing out, queued providers only
    /// (default: 30, a 300-second ceiling at the default interval)
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn env_key(var: &str) -> String {
    std::env::var(var).unwrap_or_default()
}

fn default_nanobanana() -> ServiceConfig {
    ServiceConfig {
        api_key: env_key("NANOBANANA_API_KEY"),
        base_url: "https://api.nanobanana.com/v1".to_string(),
        rate_limit: 10,
        poll_interval_secs: default_poll_interval_secs(),
        max_poll_attempts: default_max_poll_attempts(),
    }
}

fn default_stability() -> ServiceConfig {
    ServiceConfig {
        api_key: env_key("STABILITY_API_KEY"),
        base_url: "https://api.stability.ai/v1".to_string(),
        rate_limit: 150,
        poll_interval_secs: default_poll_interval_secs(),
        max_poll_attempts: default_max_poll_attempts(),
    }
}

fn default_midjourney() -> ServiceConfig {
    ServiceConfig {
        api_key: env_key("MIDJOURNEY_API_KEY"),
        base_url: "https://api.midjourney.com/v1".to_string(),
        rate_limit: 5,
        poll_interval_secs: default_poll_interval_secs(),
        max_poll_attempts: default_max_poll_attempts(),
    }
}

fn default_elevenlabs() -> ServiceConfig {
    ServiceConfig {
        api_key: env_key("ELEVENLABS_API_KEY"),
        base_url: "https://api.elevenlabs.io/v1".to_string(),
        rate_limit: 20,
        poll_interval_secs: default_poll_interval_secs(),
        max_poll_attempts: default_max_poll_attempts(),
    }
}

/// Service table: one [`ServiceConfig`] per provider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Fast low-latency image synthesis service
    #[serde(default = "default_nanobanana")]
    pub nanobanana: ServiceConfig,

    /// High-fidelity diffusion service
    #[serde(default = "default_stability")]
    pub stability: ServiceConfig,

    /// Queued, style-driven image service
    #[serde(default = "default_midjourney")]
    pub midjourney: ServiceConfig,

    /// Audio generation service
    #[serde(default = "default_elevenlabs")]
    pub elevenlabs: ServiceConfig,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nanobanana: default_nanobanana(),
            stability: default_stability(),
            midjourney: default_midjourney(),
            elevenlabs: default_elevenlabs(),
        }
    }
}

impl ServicesConfig {
    /// Look up the configuration for one provider
    pub fn get(&self, id: ProviderId) -> &ServiceConfig {
        match id {
            ProviderId::NanoBanana => &self.nanobanana,
            ProviderId::Stability => &self.stability,
            ProviderId::Midjourney => &self.midjourney,
            ProviderId::ElevenLabs => &self.elevenlabs,
        }
    }

    /// Iterate over all (provider, config) pairs
    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &ServiceConfig)> {
        [
            (ProviderId::NanoBanana, &self.nanobanana),
            (ProviderId::Stability, &self.stability),
            (ProviderId::Midjourney, &self.midjourney),
            (ProviderId::ElevenLabs, &self.elevenlabs),
        ]
        .into_iter()
    }
}

/// Output directory layout, relative to the project root
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for image artifacts (default: "assets/generated/images")
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Directory for volumetric artifacts (default: "assets/generated/volumetric")
    #[serde(default = "default_volumetric_dir")]
    pub volumetric_dir: PathBuf,

    /// Directory for audio artifacts (default: "assets/generated/audio")
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// Directory for metadata sidecars (default: "assets/generated/metadata")
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: PathBuf,

    /// Default session report path (default: "assets/generated/generation_report.json")
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("assets/generated/images")
}

fn default_volumetric_dir() -> PathBuf {
    PathBuf::from("assets/generated/volumetric")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("assets/generated/audio")
}

fn default_metadata_dir() -> PathBuf {
    PathBuf::from("assets/generated/metadata")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("assets/generated/generation_report.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            volumetric_dir: default_volumetric_dir(),
            audio_dir: default_audio_dir(),
            metadata_dir: default_metadata_dir(),
            report_path: default_report_path(),
        }
    }
}

impl OutputConfig {
    /// Artifact directory for one asset kind
    pub fn dir_for(&self, kind: AssetKind) -> &PathBuf {
        match kind {
            AssetKind::Image => &self.image_dir,
            AssetKind::Volumetric => &self.volumetric_dir,
            AssetKind::Audio => &self.audio_dir,
        }
    }
}

/// Routing rules for one asset kind
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KindRoutes {
    /// Explicit category-to-provider mappings
    #[serde(default)]
    pub categories: HashMap<String, ProviderId>,

    /// Provider used when no category matches (None = unsupported)
    #[serde(default)]
    pub fallback: Option<ProviderId>,
}

/// Routing policy as data: (kind, category) to provider, with per-kind
/// fallbacks
///
/// The table can be extended in configuration without touching dispatch
/// code. The defaults encode the documented policy: sprites and characters
/// go to the fast synthesis service, backgrounds and environments to the
/// diffusion service, UI art to the queued service, and anything else falls
/// back to diffusion; volumetric assets have no route; audio routes to the
/// (unimplemented) audio service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Routes for image requests
    #[serde(default = "default_image_routes")]
    pub image: KindRoutes,

    /// Routes for volumetric requests
    #[serde(default)]
    pub volumetric: KindRoutes,

    /// Routes for audio requests
    #[serde(default = "default_audio_routes")]
    pub audio: KindRoutes,
}

fn default_image_routes() -> KindRoutes {
    let categories = [
        ("sprite", ProviderId::NanoBanana),
        ("character", ProviderId::NanoBanana),
        ("background", ProviderId::Stability),
        ("environment", ProviderId::Stability),
        ("ui", ProviderId::Midjourney),
        ("icon", ProviderId::Midjourney),
    ]
    .into_iter()
    .map(|(category, provider)| (category.to_string(), provider))
    .collect();

    KindRoutes {
        categories,
        fallback: Some(ProviderId::Stability),
    }
}

fn default_audio_routes() -> KindRoutes {
    KindRoutes {
        categories: HashMap::new(),
        fallback: Some(ProviderId::ElevenLabs),
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            image: default_image_routes(),
            volumetric: KindRoutes::default(),
            audio: default_audio_routes(),
        }
    }
}

impl RoutingConfig {
    /// Routing rules for one asset kind
    pub fn for_kind(&self, kind: AssetKind) -> &KindRoutes {
        match kind {
            AssetKind::Image => &self.image,
            AssetKind::Volumetric => &self.volumetric,
            AssetKind::Audio => &self.audio,
        }
    }
}

/// Main configuration for the generation engine
///
/// `Config::default()` works out of the box: service credentials come from
/// the environment (NANOBANANA_API_KEY, STABILITY_API_KEY,
/// MIDJOURNEY_API_KEY, ELEVENLABS_API_KEY) and directories land under
/// `assets/generated/` in the project root.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-provider service settings
    #[serde(default)]
    pub services: ServicesConfig,

    /// Output directory layout
    #[serde(default)]
    pub output: OutputConfig,

    /// Routing policy
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl Config {
    /// Validate settings that serde cannot enforce
    ///
    /// Every configured service must have a positive rate limit; the rate
    /// limiter's wait-time arithmetic is undefined for a zero quota.
    pub fn validate(&self) -> Result<()> {
        for (id, service) in self.services.iter() {
            if service.rate_limit == 0 {
                return Err(Error::Config {
                    message: format!("service '{id}' has a zero rate limit"),
                    key: Some("rate_limit".to_string()),
                });
            }
        }
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_table() {
        let config = Config::default();
        assert_eq!(config.services.nanobanana.rate_limit, 10);
        assert_eq!(config.services.stability.rate_limit, 150);
        assert_eq!(config.services.midjourney.rate_limit, 5);
        assert_eq!(config.services.elevenlabs.rate_limit, 20);
        assert_eq!(
            config.services.midjourney.base_url,
            "https://api.midjourney.com/v1"
        );
        assert_eq!(config.services.midjourney.poll_interval_secs, 10);
        assert_eq!(config.services.midjourney.max_poll_attempts, 30);
    }

    #[test]
    fn test_default_routing_table() {
        let routing = RoutingConfig::default();
        assert_eq!(
            routing.image.categories.get("sprite"),
            Some(&ProviderId::NanoBanana)
        );
        assert_eq!(routing.image.fallback, Some(ProviderId::Stability));
        assert!(routing.volumetric.categories.is_empty());
        assert_eq!(routing.volumetric.fallback, None);
        assert_eq!(routing.audio.fallback, Some(ProviderId::ElevenLabs));
    }

    #[test]
    fn test_validate_rejects_zero_rate_limit() {
        let mut config = Config::default();
        config.services.stability.rate_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stability"));
    }

    #[test]
    fn test_config_deserializes_with_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "services": {
                    "midjourney": {
                        "api_key": "k",
                        "base_url": "http://localhost:9999",
                        "rate_limit": 2,
                        "poll_interval_secs": 1
                    }
                },
                "routing": {
                    "image": {
                        "categories": {"portrait": "midjourney"},
                        "fallback": "nanobanana"
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.services.midjourney.rate_limit, 2);
        assert_eq!(config.services.midjourney.poll_interval_secs, 1);
        assert_eq!(config.services.midjourney.max_poll_attempts, 30);
        // Untouched services keep their defaults
        assert_eq!(config.services.stability.rate_limit, 150);
        assert_eq!(
            config.routing.image.categories.get("portrait"),
            Some(&ProviderId::Midjourney)
        );
        assert_eq!(config.routing.image.fallback, Some(ProviderId::NanoBanana));
    }
}
