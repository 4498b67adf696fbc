//! Artifact persistence: deterministic identifiers, integrity checksums,
//! and metadata sidecars

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::types::{AssetKind, AssetMetadata, AssetRequest, GeneratedAsset};

/// Sidecar schema version recorded in every metadata document
const METADATA_VERSION: &str = "1.0";

/// Writes generated artifacts and their metadata sidecars under a project
/// root
///
/// Write paths are per-identifier, so concurrent saves need no cross-task
/// locking.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    project_root: PathBuf,
    output: OutputConfig,
}

impl ArtifactStore {
    /// Create a store rooted at `project_root`, creating all output
    /// directories up front
    pub fn new(project_root: &Path, output: OutputConfig) -> Result<Self> {
        let store = Self {
            project_root: project_root.to_path_buf(),
            output,
        };
        for kind in [AssetKind::Image, AssetKind::Volumetric, AssetKind::Audio] {
            std::fs::create_dir_all(store.artifact_dir(kind))?;
        }
        std::fs::create_dir_all(store.metadata_dir())?;
        Ok(store)
    }

    fn artifact_dir(&self, kind: AssetKind) -> PathBuf {
        self.project_root.join(self.output.dir_for(kind))
    }

    fn metadata_dir(&self) -> PathBuf {
        self.project_root.join(&self.output.metadata_dir)
    }

    /// Derive the artifact identifier for a request
    ///
    /// The identifier is `{kind}_{category}_{hash}_{timestamp}` where `hash`
    /// is the first 8 hex characters of the md5 of
    /// `prompt-kind-category-style` and `timestamp` is the current unix
    /// second. It is stable for identical requests within one second and is
    /// **not** derived from the output bytes: repeated generations of the
    /// same request in the same second share an identifier, and identical
    /// output from different prompts is never deduplicated. The sidecar's
    /// sha256 checksum is the integrity record for the bytes themselves.
    pub fn derive_id(request: &AssetRequest) -> String {
        Self::derive_id_at(request, Utc::now().timestamp())
    }

    fn derive_id_at(request: &AssetRequest, timestamp: i64) -> String {
        let content = format!(
            "{}-{}-{}-{}",
            request.prompt, request.kind, request.category, request.style
        );
        let digest = format!("{:x}", md5::compute(content.as_bytes()));
        format!(
            "{}_{}_{}_{}",
            request.kind,
            request.category,
            &digest[..8],
            timestamp
        )
    }

    /// Persist artifact bytes and their metadata sidecar, returning the
    /// asset record
    ///
    /// The artifact file is written first, then the sidecar. A sidecar
    /// failure fails the whole save so an artifact is never reported as a
    /// success without its metadata; the already-written artifact file is
    /// left behind in that case.
    pub async fn save(
        &self,
        request: &AssetRequest,
        bytes: &[u8],
        format: &str,
        provider: &str,
    ) -> Result<GeneratedAsset> {
        let id = Self::derive_id(request);
        let file_path = self.artifact_dir(request.kind).join(format!("{id}.{format}"));

        tokio::fs::write(&file_path, bytes)
            .await
            .map_err(|e| Error::Persistence {
                path: file_path.clone(),
                message: e.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let checksum = format!("{:x}", hasher.finalize());

        let created_at = Utc::now();
        let metadata = AssetMetadata {
            generation_service: provider.to_string(),
            original_request: request.clone(),
            file_format: format.to_string(),
            file_size: bytes.len() as u64,
            checksum: checksum.clone(),
            created_at,
            version: METADATA_VERSION.to_string(),
        };

        let metadata_path = self.metadata_dir().join(format!("{id}.json"));
        let sidecar = serde_json::to_vec_pretty(&metadata)?;
        tokio::fs::write(&metadata_path, sidecar)
            .await
            .map_err(|e| Error::Persistence {
                path: metadata_path.clone(),
                message: e.to_string(),
            })?;

        Ok(GeneratedAsset {
            id,
            request: request.clone(),
            file_path,
            service_used: provider.to_string(),
            // Stamped by the orchestrator once the item resolves
            generation_time: 0.0,
            file_size: bytes.len() as u64,
            checksum,
            metadata,
            created_at,
        })
    }
}
