//! Asset-request manifest loading
//!
//! The manifest is a JSON document with an `assets` array of request
//! objects. Missing optional fields take their documented defaults; an
//! unrecognized asset type or an invalid field value rejects the manifest
//! at load time, before any generation starts.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::AssetRequest;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    assets: Vec<AssetRequest>,
}

/// Load and validate asset requests from a JSON manifest file
///
/// Returns the requests in manifest order. An empty `assets` array loads
/// successfully; callers decide whether an empty batch is fatal.
pub async fn load_asset_requests(path: &Path) -> Result<Vec<AssetRequest>> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        Error::InvalidManifest(format!("failed to read {}: {e}", path.display()))
    })?;

    let manifest: Manifest = serde_json::from_slice(&raw).map_err(|e| {
        Error::InvalidManifest(format!("failed to parse {}: {e}", path.display()))
    })?;

    for request in &manifest.assets {
        request.validate()?;
    }

    tracing::debug!(
        count = manifest.assets.len(),
        path = %path.display(),
        "loaded asset manifest"
    );
    Ok(manifest.assets)
}
