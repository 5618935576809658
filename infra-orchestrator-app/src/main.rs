//! Infra Orchestrator entry point
//!
//! Loads the configuration, restores DNS accounts, runs one full
//! synchronization pass and prints the summary as JSON on stdout.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use infra_orchestrator_app::{AppConfig, AppStateBuilder};
use infra_orchestrator_provider::{CloudflareProvider, GithubProvider};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the summary
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    let max_retries = config.settings.max_retries;

    let state = AppStateBuilder::new()
        .repo_service(Arc::new(
            GithubProvider::new(config.github_token.clone()).with_max_retries(max_retries),
        ))
        .dns_service(Arc::new(
            CloudflareProvider::new().with_max_retries(max_retries),
        ))
        .settings(config.settings.clone())
        .build()
        .context("Failed to build application state")?;

    tracing::info!(
        "Starting Infra Orchestrator with {} DNS account(s)",
        config.cloudflare_accounts.len()
    );
    state
        .run_startup(config.accounts())
        .await
        .context("Startup failed")?;

    let summary = state.sync().await.context("Synchronization failed")?;
    for failure in &summary.zones.failures {
        tracing::warn!("Zones of account {} unavailable: {}", failure.account_id, failure.reason);
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
