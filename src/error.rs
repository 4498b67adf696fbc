//! Error types for asset-gen
//!
//! This module provides the error handling for the library:
//! - A top-level [`Error`] with context-carrying variants
//! - A nested [`ProviderError`] for failures inside provider clients
//! - Classification of skip-vs-failure via [`Error::is_unsupported`]
//!
//! Every per-item error is caught at the item boundary by the batch
//! orchestrator; only configuration and manifest errors are fatal to a run.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{AssetKind, ProviderId};

/// Result type alias for asset-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for asset-gen
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "rate_limit")
        key: Option<String>,
    },

    /// Asset-request manifest could not be loaded or contained invalid items
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// No provider is routed for this kind/category combination
    ///
    /// Recorded as a skip by the orchestrator, not as a failure.
    #[error("no generation route for {kind} asset in category '{category}'")]
    Unrouted {
        /// The asset kind with no routing target
        kind: AssetKind,
        /// The request category that failed to match a route
        category: String,
    },

    /// Failure reported by or while talking to a generation provider
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Artifact or sidecar write failed
    #[error("persistence error at {path}: {message}")]
    Persistence {
        /// Path of the file that could not be written
        path: PathBuf,
        /// Description of the underlying failure
        message: String,
    },
}

impl Error {
    /// Whether this error means "no implementation exists for this request"
    ///
    /// The orchestrator records such items as skipped rather than failed:
    /// they carry no error trace and do not count against the failure tally.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::Unrouted { .. } | Error::Provider(ProviderError::NotImplemented { .. })
        )
    }
}

/// Errors raised by provider clients
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider returned a non-success HTTP status
    #[error("{provider} returned status {status}")]
    Status {
        /// The provider that returned the status
        provider: ProviderId,
        /// The HTTP status code
        status: u16,
    },

    /// Provider returned a success response containing no artifacts
    #[error("{provider} produced no artifacts")]
    Empty {
        /// The provider whose response was empty
        provider: ProviderId,
    },

    /// Provider response did not match the expected shape
    #[error("unexpected {provider} response: {reason}")]
    Malformed {
        /// The provider whose response was malformed
        provider: ProviderId,
        /// What was wrong with the response
        reason: String,
    },

    /// Provider payload could not be decoded into artifact bytes
    #[error("failed to decode {provider} payload: {reason}")]
    Decode {
        /// The provider whose payload failed to decode
        provider: ProviderId,
        /// Description of the decode failure
        reason: String,
    },

    /// Queued provider explicitly reported the job as failed
    #[error("{provider} job {job_id} failed")]
    JobFailed {
        /// The provider running the job
        provider: ProviderId,
        /// The provider-assigned job handle
        job_id: String,
    },

    /// Queued provider did not resolve the job within the polling budget
    ///
    /// Distinct from [`ProviderError::JobFailed`]: the provider never
    /// reported a terminal state before the attempt budget ran out.
    #[error("{provider} job {job_id} timed out after {attempts} poll attempts")]
    Timeout {
        /// The provider running the job
        provider: ProviderId,
        /// The provider-assigned job handle
        job_id: String,
        /// Number of poll attempts made before giving up
        attempts: u32,
    },

    /// No client implementation exists for this provider
    #[error("{provider} generation is not implemented")]
    NotImplemented {
        /// The provider lacking an implementation
        provider: ProviderId,
    },
}
