//! Record reconciler command-line driver
//!
//! Reads one invocation event (JSON), runs it through the reconciler against
//! Route 53 and prints the result envelope on stdout. With `--drive` the
//! binary plays the engine's part: it sleeps for `callback_sec` and feeds
//! `pass_back_data` back in until the run completes.
//!
//! Diagnostics go to stderr; `RUST_LOG` controls the level (default `info`).

mod cli;
mod driver;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use record_reconciler_core::{ReconcileEvent, Reconciler, ReconcilerConfig};
use record_reconciler_provider::create_provider;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the envelope; logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()).await {
        Ok(true) => ExitCode::FAILURE,
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the final envelope reports an error.
async fn run(args: Args) -> Result<bool> {
    let event = read_event(&args.event).await?;
    let config = args.apply_overrides(load_config(args.config.as_deref()).await?);

    let provider = create_provider(args.credentials()).context("Failed to create provider")?;
    tracing::info!("Using provider {}", provider.id());
    let reconciler = Reconciler::new(provider, config);

    let response = driver::run(&reconciler, event, args.drive, args.max_rounds).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{output}");

    Ok(response.error.is_some())
}

async fn read_event(source: &str) -> Result<ReconcileEvent> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read event from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read event file {source}"))?
    };
    serde_json::from_str(&raw).context("Invalid event JSON")
}

async fn load_config(path: Option<&std::path::Path>) -> Result<ReconcilerConfig> {
    let Some(path) = path else {
        return Ok(ReconcilerConfig::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw).context("Invalid config JSON")
}
