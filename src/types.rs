//! Core types for asset-gen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// The kind of asset to generate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// 2D image content (sprites, backgrounds, UI art)
    Image,
    /// 3D volumetric content (meshes, models)
    Volumetric,
    /// Audio content (sound effects, music, voice)
    Audio,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Volumetric => write!(f, "volumetric"),
            AssetKind::Audio => write!(f, "audio"),
        }
    }
}

/// Identifier for a remote generation service
///
/// Each variant corresponds to one provider client implementation. The
/// lowercase serialized form is used in routing configuration and in the
/// `service_used` field of generated assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Fast low-latency image synthesis
    NanoBanana,
    /// High-fidelity diffusion image generation
    Stability,
    /// Queued, style-driven image generation (job submit + poll)
    Midjourney,
    /// Audio generation
    ElevenLabs,
}

impl ProviderId {
    /// Lowercase provider name as used in logs, routing tables, and asset
    /// provenance records
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::NanoBanana => "nanobanana",
            ProviderId::Stability => "stability",
            ProviderId::Midjourney => "midjourney",
            ProviderId::ElevenLabs => "elevenlabs",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declarative request for one generated asset
///
/// Loaded from the manifest file; immutable once constructed. Missing
/// optional fields take the documented defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetRequest {
    /// Text prompt describing the desired content
    pub prompt: String,

    /// Asset kind; an unrecognized kind fails manifest loading
    #[serde(rename = "type")]
    pub kind: AssetKind,

    /// Free-form category tag influencing routing (e.g. "sprite", "background")
    pub category: String,

    /// Style modifier appended to provider prompts (default: "cyberpunk")
    #[serde(default = "default_style")]
    pub style: String,

    /// Output width in pixels (default: 512)
    #[serde(default = "default_dimension")]
    pub width: u32,

    /// Output height in pixels (default: 512)
    #[serde(default = "default_dimension")]
    pub height: u32,

    /// Duration in seconds, audio only (default: 2.0)
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Quality hint in the range 0.0–1.0 (default: 0.8)
    #[serde(default = "default_quality")]
    pub quality: f64,

    /// Free-form tags attached to the generated asset
    #[serde(default)]
    pub tags: Vec<String>,

    /// Open extension map for caller-defined metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_style() -> String {
    "cyberpunk".to_string()
}

fn default_dimension() -> u32 {
    512
}

fn default_duration() -> f64 {
    2.0
}

fn default_quality() -> f64 {
    0.8
}

impl AssetRequest {
    /// Validate field constraints that serde defaults cannot enforce
    ///
    /// Dimensions must be positive and quality must lie in 0.0–1.0. Called
    /// at manifest load time so invalid requests are rejected before any
    /// generation starts.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidManifest(format!(
                "asset '{}': width and height must be positive (got {}x{})",
                truncate(&self.prompt, 30),
                self.width,
                self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(Error::InvalidManifest(format!(
                "asset '{}': quality must be in 0.0–1.0 (got {})",
                truncate(&self.prompt, 30),
                self.quality
            )));
        }
        Ok(())
    }
}

/// Truncate a string to at most `max` characters for log/error display
pub(crate) fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Sidecar metadata record persisted alongside each artifact
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Provider that generated the artifact
    pub generation_service: String,
    /// The request the artifact was generated from
    pub original_request: AssetRequest,
    /// File format extension (e.g. "png")
    pub file_format: String,
    /// Artifact size in bytes
    pub file_size: u64,
    /// Hex-encoded sha256 digest of the artifact bytes
    pub checksum: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Sidecar schema version
    pub version: String,
}

/// The result of one successful generation
///
/// Constructed exactly once by the artifact store after the artifact and its
/// metadata sidecar are durably written. `generation_time` is stamped by the
/// orchestrator before the asset becomes visible in any result set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedAsset {
    /// Deterministic identifier derived from the request (see `ArtifactStore`)
    pub id: String,
    /// The originating request
    pub request: AssetRequest,
    /// Path of the persisted artifact file
    pub file_path: PathBuf,
    /// Name of the provider that produced the bytes
    pub service_used: String,
    /// Wall-clock seconds from dispatch to completion
    pub generation_time: f64,
    /// Artifact size in bytes
    pub file_size: u64,
    /// Hex-encoded sha256 digest of the artifact bytes
    pub checksum: String,
    /// Full sidecar metadata record
    pub metadata: AssetMetadata,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Aggregated result of one batch invocation
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    /// Successfully generated assets (order is not related to input order)
    pub assets: Vec<GeneratedAsset>,
    /// Number of requests submitted
    pub total: usize,
    /// Number of requests that failed (provider, decode, or persistence errors)
    pub failed: usize,
    /// Number of requests skipped for lack of a provider implementation
    pub skipped: usize,
}

impl BatchOutcome {
    /// Number of successful generations
    pub fn successful(&self) -> usize {
        self.assets.len()
    }
}

/// Summary header of a generation session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    /// When the session report was assembled
    pub timestamp: DateTime<Utc>,
    /// Number of requests submitted in the batch
    pub total_assets: usize,
    /// Number of requests that produced an artifact
    pub successful_generations: usize,
}

/// Durable machine-readable record of a batch invocation
///
/// Written once per batch; never mutated after write.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Session summary counts
    pub generation_session: SessionSummary,
    /// Every successfully generated asset, with full provenance
    pub assets: Vec<GeneratedAsset>,
}

impl GenerationReport {
    /// Assemble a report from a batch outcome
    pub fn new(outcome: &BatchOutcome) -> Self {
        Self {
            generation_session: SessionSummary {
                timestamp: Utc::now(),
                total_assets: outcome.total,
                successful_generations: outcome.successful(),
            },
            assets: outcome.assets.clone(),
        }
    }

    /// Write the report as pretty-printed JSON, creating parent directories
    /// as needed
    pub async fn write(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Events emitted during batch generation
///
/// Subscribe via [`AssetGenerator::subscribe`](crate::AssetGenerator::subscribe).
/// Consumers that fall behind may miss events (broadcast semantics); the
/// batch outcome and report remain the authoritative record.
#[derive(Clone, Debug, Serialize)]
pub enum Event {
    /// Generation of one request has been dispatched
    Started {
        /// Position of the request in the submitted batch
        index: usize,
        /// Asset kind
        kind: AssetKind,
        /// Prompt, truncated for display
        prompt: String,
    },

    /// One request completed successfully
    Completed {
        /// Position of the request in the submitted batch
        index: usize,
        /// Identifier of the generated asset
        id: String,
        /// Provider that produced the bytes
        provider: String,
        /// Wall-clock seconds from dispatch to completion
        duration_secs: f64,
    },

    /// One request failed; sibling requests are unaffected
    Failed {
        /// Position of the request in the submitted batch
        index: usize,
        /// Provider the request was routed to, if routing succeeded
        provider: Option<String>,
        /// Human-readable failure description
        error: String,
    },

    /// One request was skipped (no provider implementation)
    Skipped {
        /// Position of the request in the submitted batch
        index: usize,
        /// Asset kind
        kind: AssetKind,
        /// Request category
        category: String,
        /// Why the request was not attempted
        reason: String,
    },

    /// The whole batch has resolved
    BatchFinished {
        /// Number of requests submitted
        total: usize,
        /// Number of successful generations
        successful: usize,
        /// Number of failed requests
        failed: usize,
        /// Number of skipped requests
        skipped: usize,
    },
}
