//! Single-unit pipeline: fetch, parse, write
//!
//! Every error raised while processing a unit stays inside the unit's
//! `UnitOutcome`; nothing here propagates to the coordinator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use scraper::Html;
use tracing::{debug, error, info};

use super::tasks::{TaskFailure, TaskId, TaskState, UnitOutcome};
use crate::domain::{ServiceUnit, UnitDocument};
use crate::infrastructure::{DocumentWriter, PageFetcher, UnitPageExtractor, UnitParseContext};

pub struct UnitWorker {
    fetcher: Arc<dyn PageFetcher>,
    extractor: UnitPageExtractor,
    writer: DocumentWriter,
    skip_empty_documents: bool,
}

impl UnitWorker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: UnitPageExtractor,
        writer: DocumentWriter,
        skip_empty_documents: bool,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            writer,
            skip_empty_documents,
        }
    }

    /// Run one unit to a terminal state
    pub async fn process(&self, unit: ServiceUnit) -> UnitOutcome {
        let task_id = TaskId::new();
        let started = Instant::now();
        let mut state = TaskState::Pending;
        debug!("🚀 [{}] Harvesting {}", task_id, unit);

        let (terminal, records, output) = match self.run(&unit, &mut state, &task_id).await {
            Ok((records, output)) => {
                info!(
                    "✅ {} done: {} actions in {}ms",
                    unit.display_name,
                    records,
                    started.elapsed().as_millis()
                );
                (TaskState::Done, records, output)
            }
            Err(cause) => {
                error!("❌ {} failed: {}", unit.display_name, cause);
                (TaskState::Failed(cause), 0, None)
            }
        };
        transition(&mut state, terminal, &task_id);

        UnitOutcome {
            task_id,
            unit,
            state,
            records,
            output,
        }
    }

    /// Fetch and parse a unit without writing anything
    pub async fn extract(&self, unit: &ServiceUnit) -> Result<UnitDocument, TaskFailure> {
        let mut state = TaskState::Pending;
        self.fetch_and_parse(unit, &mut state, &TaskId::new()).await
    }

    async fn run(
        &self,
        unit: &ServiceUnit,
        state: &mut TaskState,
        task_id: &TaskId,
    ) -> Result<(usize, Option<PathBuf>), TaskFailure> {
        let document = self.fetch_and_parse(unit, state, task_id).await?;
        let records = document.records.len();

        if document.is_empty() && self.skip_empty_documents {
            info!("⏭️ {} has no actions, nothing written", unit.display_name);
            return Ok((0, None));
        }

        transition(state, TaskState::Writing, task_id);
        let path = self.writer.write(&document).await?;
        debug!("💾 {} saved to {:?}", unit.display_name, path);
        Ok((records, Some(path)))
    }

    async fn fetch_and_parse(
        &self,
        unit: &ServiceUnit,
        state: &mut TaskState,
        task_id: &TaskId,
    ) -> Result<UnitDocument, TaskFailure> {
        transition(state, TaskState::Fetching, task_id);
        let body = self.fetcher.fetch(&unit.detail_url).await?;

        transition(state, TaskState::Parsing, task_id);
        let html = Html::parse_document(&body);
        Ok(self.extractor.extract(&html, &UnitParseContext::from(unit)))
    }
}

fn transition(state: &mut TaskState, next: TaskState, task_id: &TaskId) {
    if let Err(e) = state.advance(next) {
        debug!("[{}] {}", task_id, e);
    }
}
