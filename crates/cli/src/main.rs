use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upgradarr_core::{
    load_config, InstanceKind, LibraryClient, ManagedInstance, RadarrClient, RunOrchestrator,
    SearchHistory, SonarrClient,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Pick up a .env in the working directory, if present.
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(version = VERSION, "Starting upgradarr");

    let config = load_config().context("Failed to load configuration from environment")?;
    info!(
        instances = config.instances.len(),
        max_upgrades = config.settings.max_upgrades,
        cooldown_days = config.settings.history_cooldown_days,
        dry_run = config.settings.dry_run,
        "Configuration loaded"
    );
    if config.instances.is_empty() {
        warn!("No instances configured, nothing to do");
    }

    let timeout = config.settings.http_timeout();
    let instances: Vec<ManagedInstance> = config
        .instances
        .iter()
        .map(|instance| {
            info!(instance = %instance.id, url = %instance.url, cap = %instance.upgrade_cap,
                "Loaded instance");
            let client: Arc<dyn LibraryClient> = match instance.id.kind {
                InstanceKind::Radarr => Arc::new(RadarrClient::new(instance, timeout)),
                InstanceKind::Sonarr => Arc::new(SonarrClient::new(instance, timeout)),
            };
            ManagedInstance {
                cap: instance.upgrade_cap,
                client,
            }
        })
        .collect();

    let history = SearchHistory::load(
        &config.settings.history_file,
        Utc::now(),
        config.settings.cooldown(),
    );
    info!(entries = history.len(), "Search history loaded");

    let mut orchestrator = RunOrchestrator::new(
        config.settings.clone(),
        instances,
        history,
        StdRng::from_entropy(),
    );
    let summary = orchestrator
        .run()
        .await
        .context("Run failed")?;

    for report in &summary.instances {
        match &report.error {
            Some(error) => warn!(instance = %report.instance, %error, "Instance skipped"),
            None => info!(
                instance = %report.instance,
                catalog = report.catalog_size,
                eligible = report.eligible,
                selected = report.selected,
                triggered = report.triggered,
                "Instance processed"
            ),
        }
    }
    info!(
        selected = summary.total_selected(),
        skipped = summary.skipped_instances(),
        dry_run = summary.dry_run,
        "upgradarr finished"
    );

    Ok(())
}
