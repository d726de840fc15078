//! Concurrent harvest pipeline
//!
//! Coordinator, per-unit worker and the task state machine they share.

pub mod coordinator;
pub mod tasks;
pub mod worker;

pub use coordinator::{HarvestCoordinator, HarvestError};
pub use tasks::{HarvestSummary, TaskFailure, TaskId, TaskState, UnitOutcome};
pub use worker::UnitWorker;
