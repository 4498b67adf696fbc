//! Batch generation engine
//!
//! The [`AssetGenerator`] fans a list of asset requests out as one tokio
//! task per request, routes each to a provider, serializes provider access
//! through per-provider rate limiters, persists successful results, and
//! aggregates everything behind a join barrier. One item's failure never
//! aborts its siblings; the only cross-task shared state is the limiter map.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::providers::{self, ProviderRegistry};
use crate::rate_limiter::RateLimiter;
use crate::router::Router;
use crate::store::ArtifactStore;
use crate::types::{AssetRequest, BatchOutcome, Event, GeneratedAsset, ProviderId, truncate};

/// Outbound request timeout applied to every provider call
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Capacity of the generation event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Resolution of one batch item
enum ItemOutcome {
    Success(Box<GeneratedAsset>),
    Failed,
    Skipped,
}

/// Batch generation engine
///
/// Cloneable: all fields are shared, so clones observe the same limiters,
/// providers, and event channel. Construct once per process (or per project
/// root) and reuse across batches.
#[derive(Clone)]
pub struct AssetGenerator {
    config: Arc<Config>,
    router: Arc<Router>,
    store: Arc<ArtifactStore>,
    providers: Arc<ProviderRegistry>,
    rate_limiters: Arc<HashMap<ProviderId, RateLimiter>>,
    event_tx: broadcast::Sender<Event>,
}

impl AssetGenerator {
    /// Create an engine with the default provider clients
    ///
    /// Builds one HTTP client shared by all providers and creates the output
    /// directory tree under `project_root`.
    pub fn new(config: Config, project_root: &Path) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let registry = providers::build_registry(&http, &config.services);
        Self::with_providers(config, project_root, registry)
    }

    /// Create an engine with a caller-supplied provider registry
    ///
    /// The seam for substituting provider implementations (stubs, doubles,
    /// alternative backends) without touching routing or orchestration.
    pub fn with_providers(
        config: Config,
        project_root: &Path,
        registry: ProviderRegistry,
    ) -> Result<Self> {
        config.validate()?;

        let mut rate_limiters = HashMap::new();
        for (id, service) in config.services.iter() {
            rate_limiters.insert(id, RateLimiter::new(service.rate_limit)?);
        }

        let store = ArtifactStore::new(project_root, config.output.clone())?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            router: Arc::new(Router::new(config.routing.clone())),
            store: Arc::new(store),
            providers: Arc::new(registry),
            rate_limiters: Arc::new(rate_limiters),
            config: Arc::new(config),
            event_tx,
        })
    }

    /// The engine's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to generation events
    ///
    /// Multiple subscribers are supported; see [`Event`] for the stream
    /// contents.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Generate a batch of assets concurrently
    ///
    /// Spawns one task per request and joins them all; the returned outcome
    /// carries every successful asset plus failure/skip tallies. Success
    /// order is completion order, not input order — each asset records its
    /// originating request.
    pub async fn generate_batch(&self, requests: Vec<AssetRequest>) -> BatchOutcome {
        let total = requests.len();
        info!(total, "starting asset generation batch");

        let mut tasks = JoinSet::new();
        for (index, request) in requests.into_iter().enumerate() {
            let engine = self.clone();
            tasks.spawn(async move { engine.generate_single(index, request).await });
        }

        let mut outcome = BatchOutcome {
            total,
            ..BatchOutcome::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(ItemOutcome::Success(asset)) => outcome.assets.push(*asset),
                Ok(ItemOutcome::Failed) => outcome.failed += 1,
                Ok(ItemOutcome::Skipped) => outcome.skipped += 1,
                Err(e) => {
                    error!(error = %e, "generation task panicked");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            successful = outcome.successful(),
            failed = outcome.failed,
            skipped = outcome.skipped,
            "batch finished"
        );
        let _ = self.event_tx.send(Event::BatchFinished {
            total,
            successful: outcome.successful(),
            failed: outcome.failed,
            skipped: outcome.skipped,
        });
        outcome
    }

    /// Generate one asset, containing every error at this item's boundary
    async fn generate_single(&self, index: usize, request: AssetRequest) -> ItemOutcome {
        let started = Instant::now();
        let _ = self.event_tx.send(Event::Started {
            index,
            kind: request.kind,
            prompt: truncate(&request.prompt, 50),
        });

        let Some(provider) = self.router.select(&request) else {
            info!(
                index,
                kind = %request.kind,
                category = %request.category,
                "no provider routed, skipping"
            );
            let _ = self.event_tx.send(Event::Skipped {
                index,
                kind: request.kind,
                category: request.category.clone(),
                reason: "no provider routed for this kind and category".to_string(),
            });
            return ItemOutcome::Skipped;
        };

        match self.attempt(provider, &request).await {
            Ok(mut asset) => {
                asset.generation_time = started.elapsed().as_secs_f64();
                info!(
                    index,
                    id = %asset.id,
                    provider = %provider,
                    duration_secs = asset.generation_time,
                    "asset generated"
                );
                let _ = self.event_tx.send(Event::Completed {
                    index,
                    id: asset.id.clone(),
                    provider: provider.to_string(),
                    duration_secs: asset.generation_time,
                });
                ItemOutcome::Success(Box::new(asset))
            }
            Err(e) if e.is_unsupported() => {
                info!(index, provider = %provider, kind = %request.kind, "provider not implemented, skipping");
                let _ = self.event_tx.send(Event::Skipped {
                    index,
                    kind: request.kind,
                    category: request.category.clone(),
                    reason: e.to_string(),
                });
                ItemOutcome::Skipped
            }
            Err(e) => {
                error!(
                    index,
                    provider = %provider,
                    prompt = %truncate(&request.prompt, 50),
                    error = %e,
                    "asset generation failed"
                );
                let _ = self.event_tx.send(Event::Failed {
                    index,
                    provider: Some(provider.to_string()),
                    error: e.to_string(),
                });
                ItemOutcome::Failed
            }
        }
    }

    /// Rate-limit, call the provider, and persist the result
    async fn attempt(&self, provider: ProviderId, request: &AssetRequest) -> Result<GeneratedAsset> {
        let client = self.providers.get(&provider).ok_or(Error::Unrouted {
            kind: request.kind,
            category: request.category.clone(),
        })?;

        if let Some(limiter) = self.rate_limiters.get(&provider) {
            limiter.acquire().await;
        }

        let output = client.generate(request).await?;
        self.store
            .save(request, &output.bytes, &output.format, provider.as_str())
            .await
    }
}
