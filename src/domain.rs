//! Domain module - Core entities of the harvester
//!
//! This module contains the records extracted from action tables, the
//! services discovered on the index page, and the per-service output document.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod action_record;
pub mod constants;
pub mod service_unit;
pub mod unit_document;

// Re-export commonly used items for convenience
pub use action_record::ActionRecord;
pub use service_unit::ServiceUnit;
pub use unit_document::{ActionEntry, ServiceActionsFile, UnitDocument};
