//! Per-service output document and its on-disk JSON schema
//!
//! The JSON layout keeps both `actionName` and `name` (identical values) for
//! compatibility with consumers of the earlier schema revision.

use serde::{Deserialize, Serialize};

use super::action_record::ActionRecord;

/// The harvested result for one service: its prefix and its ordered records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitDocument {
    pub prefix: String,
    pub records: Vec<ActionRecord>,
}

impl UnitDocument {
    #[must_use]
    pub fn new(prefix: String, records: Vec<ActionRecord>) -> Self {
        Self { prefix, records }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert into the serialized file schema
    #[must_use]
    pub fn to_file(&self) -> ServiceActionsFile {
        ServiceActionsFile {
            service_prefix: self.prefix.clone(),
            actions: self.records.iter().map(ActionEntry::from).collect(),
        }
    }

    /// Pretty-printed JSON, non-ASCII characters kept as-is
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_file())
    }

    /// Read a previously written document back
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: ServiceActionsFile = serde_json::from_str(json)?;
        Ok(file.into())
    }
}

/// Top-level object of one output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceActionsFile {
    pub service_prefix: String,
    pub actions: Vec<ActionEntry>,
}

/// One action as it appears in an output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    pub action_name: String,
    pub name: String,
    pub action_groups: Vec<String>,
    pub resource_types: Vec<String>,
    pub context_keys_ref: Vec<String>,
    pub description: String,
    pub doc_page_relative: String,
}

impl From<&ActionRecord> for ActionEntry {
    fn from(record: &ActionRecord) -> Self {
        Self {
            action_name: record.identifier.clone(),
            name: record.identifier.clone(),
            action_groups: record.action_groups(),
            resource_types: record.resource_types.clone(),
            context_keys_ref: record.context_keys.clone(),
            description: record.description.clone(),
            doc_page_relative: record.doc_link.clone(),
        }
    }
}

impl From<ActionEntry> for ActionRecord {
    fn from(entry: ActionEntry) -> Self {
        // Older files may only carry one of the two name fields
        let identifier = if entry.action_name.is_empty() {
            entry.name
        } else {
            entry.action_name
        };

        Self {
            identifier,
            description: entry.description,
            access_level: entry.action_groups.into_iter().next().unwrap_or_default(),
            resource_types: entry.resource_types,
            context_keys: entry.context_keys_ref,
            doc_link: entry.doc_page_relative,
        }
    }
}

impl From<ServiceActionsFile> for UnitDocument {
    fn from(file: ServiceActionsFile) -> Self {
        Self {
            prefix: file.service_prefix,
            records: file.actions.into_iter().map(ActionRecord::from).collect(),
        }
    }
}
