//! Probe: harvest only the first listed service and print its document.
//! Nothing is written to disk.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use iam_action_harvester_lib::harvest::HarvestCoordinator;
use iam_action_harvester_lib::infrastructure::{AppConfig, HttpClient, init_logging_with_config};

/// Actions echoed to the log before the JSON dump
const SAMPLE_SIZE: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;

    let client = HttpClient::new(config.http.clone()).context("Failed to create HTTP client")?;
    let coordinator = HarvestCoordinator::new(&config, Arc::new(client))?;

    let units = coordinator.discover_units().await?;
    let Some(unit) = units.first() else {
        warn!("No service links found on {}", config.harvest.entry_url);
        return Ok(());
    };

    info!("🧪 Probing first service: {}", unit);
    let document = coordinator
        .worker()
        .extract(unit)
        .await
        .with_context(|| format!("Failed to harvest {}", unit.display_name))?;

    info!("{} actions found, first {}:", document.records.len(), SAMPLE_SIZE);
    for record in document.records.iter().take(SAMPLE_SIZE) {
        info!("  {}", record);
    }

    println!("{}", document.to_json_pretty()?);
    Ok(())
}
