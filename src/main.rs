//! Command line entry point: harvest every service into the output directory.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use iam_action_harvester_lib::harvest::HarvestCoordinator;
use iam_action_harvester_lib::infrastructure::{
    AppConfig, HttpClient, init_logging_with_config, log_system_info,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    let client = HttpClient::new(config.http.clone()).context("Failed to create HTTP client")?;
    let coordinator = HarvestCoordinator::new(&config, Arc::new(client))
        .context("Failed to set up harvest coordinator")?;

    let summary = coordinator.run().await.context("Harvest aborted")?;
    info!(
        "🎉 All services saved under {:?} ({} files, {} failed)",
        summary.output_dir,
        summary.files_written.len(),
        summary.failed
    );
    Ok(())
}
