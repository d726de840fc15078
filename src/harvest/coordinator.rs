//! Harvest coordinator
//!
//! Discovers service units from the index page and fans one task per unit
//! out over a semaphore-bounded pool. Tasks report through an unbounded
//! channel; the coordinator drains it until every task has finished.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use scraper::Html;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info, warn};

use super::tasks::{HarvestSummary, TaskFailure, UnitOutcome};
use super::worker::UnitWorker;
use crate::domain::ServiceUnit;
use crate::infrastructure::{
    AppConfig, ContextualParser, DocumentWriter, FetchError, PageFetcher, ParseContext,
    ParsingConfig, ParsingError, ServiceIndexParser, UnitPageExtractor, WriteError,
};

/// Errors that abort a whole run
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Index page unavailable: {0}")]
    IndexUnavailable(#[source] FetchError),

    #[error("Output directory unavailable: {0}")]
    OutputDirectory(#[source] WriteError),

    #[error("Parser setup failed: {0}")]
    Parsing(#[from] ParsingError),
}

pub struct HarvestCoordinator {
    entry_url: String,
    base_url: String,
    worker_count: usize,
    fetcher: Arc<dyn PageFetcher>,
    index_parser: ServiceIndexParser,
    writer: DocumentWriter,
    worker: Arc<UnitWorker>,
}

impl HarvestCoordinator {
    pub fn new(config: &AppConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self, HarvestError> {
        let parsing = ParsingConfig::with_base_url(config.harvest.base_url.clone());
        let writer = DocumentWriter::new(config.harvest.output_dir.clone());
        let worker = UnitWorker::new(
            Arc::clone(&fetcher),
            UnitPageExtractor::with_config(&parsing)?,
            writer.clone(),
            config.harvest.skip_empty_documents,
        );

        Ok(Self {
            entry_url: config.harvest.entry_url.clone(),
            base_url: config.harvest.base_url.clone(),
            worker_count: config.worker_count(),
            fetcher,
            index_parser: ServiceIndexParser::with_config(&parsing)?,
            writer,
            worker: Arc::new(worker),
        })
    }

    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn worker(&self) -> &UnitWorker {
        &self.worker
    }

    /// Fetch the index page and list its service units
    pub async fn discover_units(&self) -> Result<Vec<ServiceUnit>, HarvestError> {
        let body = self
            .fetcher
            .fetch(&self.entry_url)
            .await
            .map_err(HarvestError::IndexUnavailable)?;

        let html = Html::parse_document(&body);
        let units = self
            .index_parser
            .parse_with_context(&html, &ParseContext::new(self.base_url.clone()))?;

        info!("🔍 Discovered {} service units", units.len());
        if let Some(first) = units.first() {
            info!("First unit: {}", first);
        }
        Ok(units)
    }

    /// Harvest every unit listed on the index page
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        let started = Instant::now();
        self.writer
            .ensure_output_dir()
            .await
            .map_err(HarvestError::OutputDirectory)?;

        let units = self.discover_units().await?;
        let total = units.len();
        let mut summary = HarvestSummary::new(total, self.writer.output_dir());
        if units.is_empty() {
            warn!("⚠️ Index page listed no service units, nothing to harvest");
            return Ok(summary);
        }

        info!(
            "🚀 Harvesting {} units with {} workers",
            total, self.worker_count
        );

        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<UnitOutcome>();
        let mut tasks = Vec::with_capacity(total);

        for unit in units {
            let semaphore = Arc::clone(&semaphore);
            let worker = Arc::clone(&self.worker);
            let outcome_tx = outcome_tx.clone();
            let task_unit = unit.clone();

            let task = tokio::spawn(async move {
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => worker.process(task_unit).await,
                    Err(e) => UnitOutcome::failed(task_unit, TaskFailure::Join(e.to_string())),
                };
                // Receiver outlives every task
                let _ = outcome_tx.send(outcome);
            });
            tasks.push((unit, task));
        }
        drop(outcome_tx);

        let mut seen_paths = HashSet::new();
        while let Some(outcome) = outcome_rx.recv().await {
            self.record_outcome(&mut summary, &mut seen_paths, &outcome);
        }

        // Tasks that panicked never sent an outcome
        let (units, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
        let results = futures::future::join_all(handles).await;
        for (unit, result) in units.into_iter().zip(results) {
            if let Err(e) = result {
                error!("❌ {} task aborted: {}", unit.display_name, e);
                let outcome = UnitOutcome::failed(unit, TaskFailure::Join(e.to_string()));
                self.record_outcome(&mut summary, &mut seen_paths, &outcome);
            }
        }

        info!(
            "🎯 Harvest completed in {:.1}s: {} succeeded, {} failed, {} actions total, output in {:?}",
            started.elapsed().as_secs_f64(),
            summary.succeeded,
            summary.failed,
            summary.total_records,
            summary.output_dir
        );
        if !summary.failed_units.is_empty() {
            warn!("Failed units: {}", summary.failed_units.join(", "));
        }

        Ok(summary)
    }

    fn record_outcome(
        &self,
        summary: &mut HarvestSummary,
        seen_paths: &mut HashSet<PathBuf>,
        outcome: &UnitOutcome,
    ) {
        summary.record(outcome);

        if let Some(path) = &outcome.output {
            if !seen_paths.insert(path.clone()) {
                warn!(
                    "⚠️ {} overwrote {:?} written earlier by another unit",
                    outcome.unit.display_name, path
                );
            }
        }

        let mark = if outcome.succeeded() { "✅" } else { "❌" };
        info!(
            "[{}/{}] {} {} ({} actions)",
            summary.completed(),
            summary.total_units,
            mark,
            outcome.unit.display_name,
            outcome.records
        );
    }
}
