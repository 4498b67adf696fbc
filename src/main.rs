//! CLI for the asset generation pipeline
//!
//! Thin process surface over the library: loads the request manifest,
//! runs one batch, prints per-item status lines from the event stream, and
//! writes the session report. Exits non-zero only for configuration-level
//! failures; individual item failures and skips are batch-level outcomes.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use asset_gen::{AssetGenerator, Config, Error, Event, GenerationReport, manifest};

#[derive(Debug, Parser)]
#[command(
    name = "asset-gen",
    version,
    about = "Batch pipeline for AI-generated game assets"
)]
struct Args {
    /// Asset manifest file (JSON with an "assets" array)
    #[arg(long)]
    config: PathBuf,

    /// Project root under which output directories are created
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Session report path (default: assets/generated/generation_report.json
    /// under the project root)
    #[arg(long)]
    output_report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "asset generation aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> asset_gen::Result<()> {
    if !args.config.exists() {
        return Err(Error::Config {
            message: format!("configuration file not found: {}", args.config.display()),
            key: None,
        });
    }

    let requests = manifest::load_asset_requests(&args.config).await?;
    if requests.is_empty() {
        return Err(Error::InvalidManifest(
            "no valid asset requests found".to_string(),
        ));
    }

    let config = Config::default();
    let report_path = args
        .output_report
        .unwrap_or_else(|| args.project_root.join(&config.output.report_path));

    println!("Starting asset generation pipeline");
    println!("  project root: {}", args.project_root.display());
    println!("  manifest:     {}", args.config.display());
    println!("  requests:     {}", requests.len());

    let generator = AssetGenerator::new(config, &args.project_root)?;

    let mut events = generator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Started { index, kind, prompt } => {
                    println!("[{index}] generating {kind} asset: {prompt}...");
                }
                Event::Completed {
                    index,
                    id,
                    provider,
                    duration_secs,
                } => {
                    println!("[{index}] generated {id} via {provider} in {duration_secs:.2}s");
                }
                Event::Failed {
                    index,
                    provider,
                    error,
                } => {
                    let provider = provider.unwrap_or_else(|| "-".to_string());
                    println!("[{index}] FAILED ({provider}): {error}");
                }
                Event::Skipped {
                    index,
                    kind,
                    category,
                    reason,
                } => {
                    println!("[{index}] skipped {kind}/{category}: {reason}");
                }
                Event::BatchFinished { .. } => break,
            }
        }
    });

    let outcome = generator.generate_batch(requests).await;
    let _ = printer.await;

    let report = GenerationReport::new(&outcome);
    report.write(&report_path).await?;

    println!("Report saved to {}", report_path.display());
    println!(
        "Generated {}/{} assets ({} failed, {} skipped)",
        outcome.successful(),
        outcome.total,
        outcome.failed,
        outcome.skipped
    );
    Ok(())
}
