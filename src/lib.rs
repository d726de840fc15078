//! IAM Action Harvester
//!
//! Collects every action listed in the AWS Service Authorization Reference
//! and writes one JSON document per service.

// Module declarations
pub mod domain;
pub mod harvest;
pub mod infrastructure;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

pub use domain::{ActionRecord, ServiceUnit, UnitDocument};
pub use harvest::{HarvestCoordinator, HarvestError, HarvestSummary};
