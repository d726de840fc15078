use std::fmt;

/// One action entry extracted from a service's action table.
///
/// Records are produced by the grid table parser and finalized by the record
/// normalizer, so `resource_types` and `context_keys` never hold duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionRecord {
    /// Canonical action name, never empty
    pub identifier: String,
    pub description: String,
    /// Access level ("Read", "Write", "List", ...), may be empty
    pub access_level: String,
    pub resource_types: Vec<String>,
    pub context_keys: Vec<String>,
    /// Absolute documentation URL or empty
    pub doc_link: String,
}

impl ActionRecord {
    /// Action groups as written to the output schema: the access level when
    /// present, otherwise nothing.
    #[must_use]
    pub fn action_groups(&self) -> Vec<String> {
        if self.access_level.is_empty() {
            Vec::new()
        } else {
            vec![self.access_level.clone()]
        }
    }

    #[must_use]
    pub fn has_doc_link(&self) -> bool {
        !self.doc_link.is_empty()
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.identifier, self.description)
    }
}
