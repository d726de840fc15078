//! # Harvest Task Definitions
//!
//! One task per service unit. A task moves through
//! `Pending → Fetching → Parsing → Writing → Done` and may drop into
//! `Failed` from any non-terminal state; it never moves backwards.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::ServiceUnit;
use crate::infrastructure::{FetchError, WriteError};

/// Unique identifier for harvest tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new unique task ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a task ended in `Failed`
#[derive(Error, Debug)]
pub enum TaskFailure {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    #[error("task aborted: {0}")]
    Join(String),
}

/// Per-task lifecycle
#[derive(Debug)]
pub enum TaskState {
    Pending,
    Fetching,
    Parsing,
    Writing,
    Done,
    Failed(TaskFailure),
}

/// Attempted a transition that would move a task backwards or out of a
/// terminal state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid task transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl TaskState {
    const fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Fetching => 1,
            Self::Parsing => 2,
            Self::Writing => 3,
            Self::Done | Self::Failed(_) => 4,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Fetching => "Fetching",
            Self::Parsing => "Parsing",
            Self::Writing => "Writing",
            Self::Done => "Done",
            Self::Failed(_) => "Failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Move to `next`. Skipping ahead is allowed (e.g. straight to `Failed`),
    /// going back or leaving a terminal state is not.
    pub fn advance(&mut self, next: Self) -> Result<(), InvalidTransition> {
        if self.is_terminal() || next.rank() <= self.rank() {
            return Err(InvalidTransition {
                from: self.name(),
                to: next.name(),
            });
        }
        *self = next;
        Ok(())
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Self::Failed(cause) => Some(cause),
            _ => None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(cause) => write!(f, "Failed({cause})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Final report of one task, sent to the coordinator
#[derive(Debug)]
pub struct UnitOutcome {
    pub task_id: TaskId,
    pub unit: ServiceUnit,
    pub state: TaskState,
    /// Number of records extracted (0 when the task failed before parsing)
    pub records: usize,
    /// Written file, if any
    pub output: Option<PathBuf>,
}

impl UnitOutcome {
    /// Outcome for a task that never got to run its pipeline
    pub fn failed(unit: ServiceUnit, cause: TaskFailure) -> Self {
        Self {
            task_id: TaskId::new(),
            unit,
            state: TaskState::Failed(cause),
            records: 0,
            output: None,
        }
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.state, TaskState::Done)
    }
}

/// Aggregated result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    pub total_units: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_records: usize,
    pub files_written: Vec<PathBuf>,
    pub failed_units: Vec<String>,
    pub output_dir: PathBuf,
}

impl HarvestSummary {
    pub fn new(total_units: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            total_units,
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Fold one finished task into the summary
    pub fn record(&mut self, outcome: &UnitOutcome) {
        if outcome.succeeded() {
            self.succeeded += 1;
            self.total_records += outcome.records;
            if let Some(path) = &outcome.output {
                self.files_written.push(path.clone());
            }
        } else {
            self.failed += 1;
            self.failed_units.push(outcome.unit.display_name.clone());
        }
    }

    #[must_use]
    pub const fn completed(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_succeed() {
        let mut state = TaskState::Pending;
        state.advance(TaskState::Fetching).unwrap();
        state.advance(TaskState::Parsing).unwrap();
        state.advance(TaskState::Writing).unwrap();
        state.advance(TaskState::Done).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn backward_and_terminal_transitions_are_rejected() {
        let mut state = TaskState::Parsing;
        let error = state.advance(TaskState::Fetching).unwrap_err();
        assert_eq!(error.from, "Parsing");
        assert_eq!(error.to, "Fetching");

        let mut done = TaskState::Done;
        assert!(done.advance(TaskState::Failed(TaskFailure::Join("late".into()))).is_err());
        assert!(matches!(done, TaskState::Done));
    }

    #[test]
    fn any_active_state_can_fail() {
        let mut state = TaskState::Fetching;
        state
            .advance(TaskState::Failed(TaskFailure::Join("panicked".into())))
            .unwrap();
        assert_eq!(state.name(), "Failed");
        assert!(state.failure().is_some());
        assert!(state.to_string().contains("panicked"));
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = HarvestSummary::new(2, "out");
        summary.record(&UnitOutcome {
            task_id: TaskId::new(),
            unit: ServiceUnit::new("Amazon S3", "https://example.com/list_amazons3.html"),
            state: TaskState::Done,
            records: 12,
            output: Some(PathBuf::from("out/s3.json")),
        });
        summary.record(&UnitOutcome {
            task_id: TaskId::new(),
            unit: ServiceUnit::new("AWS Broken", "https://example.com/list_broken.html"),
            state: TaskState::Failed(TaskFailure::Join("boom".into())),
            records: 0,
            output: None,
        });

        assert_eq!(summary.completed(), 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total_records, 12);
        assert_eq!(summary.files_written, vec![PathBuf::from("out/s3.json")]);
        assert_eq!(summary.failed_units, vec!["AWS Broken".to_string()]);
    }
}
