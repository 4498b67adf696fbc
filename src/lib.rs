//! # asset-gen
//!
//! Configurable batch pipeline for AI-generated game assets.
//!
//! ## Design Philosophy
//!
//! asset-gen is designed to be:
//! - **Declarative** - Describe the assets you want; the engine handles
//!   routing, throttling, and persistence
//! - **Provider-agnostic** - Generation services sit behind one trait and a
//!   data-driven routing table
//! - **Failure-isolating** - One bad request never takes down the batch
//! - **Library-first** - The CLI is a thin layer over an embeddable crate
//! - **Event-driven** - Consumers subscribe to generation events, no polling
//!   required
//!
//! ## Quick Start
//!
//! ```no_run
//! use asset_gen::{AssetGenerator, Config, manifest};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let requests = manifest::load_asset_requests(Path::new("assets.json")).await?;
//!
//!     let generator = AssetGenerator::new(Config::default(), Path::new("."))?;
//!
//!     // Subscribe to per-item progress
//!     let mut events = generator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let outcome = generator.generate_batch(requests).await;
//!     println!("generated {} of {} assets", outcome.successful(), outcome.total);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Batch generation engine
pub mod generator;
/// Asset-request manifest loading
pub mod manifest;
/// Generation provider clients
pub mod providers;
/// Per-provider request rate limiting
pub mod rate_limiter;
/// Request routing
pub mod router;
/// Artifact persistence
pub mod store;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, KindRoutes, OutputConfig, RoutingConfig, ServiceConfig, ServicesConfig};
pub use error::{Error, ProviderError, Result};
pub use generator::AssetGenerator;
pub use providers::{
    MockBehavior, MockProvider, ProviderClient, ProviderOutput, ProviderRegistry,
};
pub use rate_limiter::RateLimiter;
pub use router::Router;
pub use store::ArtifactStore;
pub use types::{
    AssetKind, AssetMetadata, AssetRequest, BatchOutcome, Event, GeneratedAsset,
    GenerationReport, ProviderId, SessionSummary,
};
