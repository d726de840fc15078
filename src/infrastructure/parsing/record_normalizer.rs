//! Raw record finalization
//!
//! The grid table parser accumulates list values as plain vectors while it
//! walks rows; this module turns those into the canonical `ActionRecord`.

use std::collections::HashSet;

use crate::domain::ActionRecord;

/// Record under construction while rows are still being merged into it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub identifier: String,
    pub description: String,
    pub access_level: String,
    pub resource_types: Vec<String>,
    pub context_keys: Vec<String>,
    pub doc_link: String,
}

/// Collapse internal whitespace runs to a single space and trim the ends
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize every entry, drop empties and duplicates, keep first-seen order
#[must_use]
pub fn dedup_preserving_order<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|value| normalize_text(value.as_ref()))
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Finalize a raw record. Returns `None` when the identifier is blank.
#[must_use]
pub fn normalize_record(raw: RawRecord) -> Option<ActionRecord> {
    let identifier = normalize_text(&raw.identifier);
    if identifier.is_empty() {
        return None;
    }

    Some(ActionRecord {
        identifier,
        description: normalize_text(&raw.description),
        access_level: normalize_text(&raw.access_level),
        resource_types: dedup_preserving_order(raw.resource_types),
        context_keys: dedup_preserving_order(raw.context_keys),
        doc_link: raw.doc_link.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_text("  Grants \n\t permission  to  "), "Grants permission to");
        assert_eq!(normalize_text(" \n "), "");
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let values = ["object*", "bucket", " object* ", "", "accesspoint", "bucket"];
        assert_eq!(
            dedup_preserving_order(values),
            vec!["object*", "bucket", "accesspoint"]
        );
    }

    #[test]
    fn blank_identifier_is_dropped() {
        let raw = RawRecord {
            identifier: " \n ".into(),
            description: "orphan".into(),
            ..Default::default()
        };
        assert_eq!(normalize_record(raw), None);
    }

    #[test]
    fn record_fields_are_cleaned() {
        let raw = RawRecord {
            identifier: " GetObject ".into(),
            description: "Grants permission\n   to retrieve objects".into(),
            access_level: "Read ".into(),
            resource_types: vec!["object*".into(), "object*".into()],
            context_keys: vec!["s3:authType".into(), " ".into(), "s3:authType".into()],
            doc_link: " https://docs.aws.amazon.com/AmazonS3/latest/API/API_GetObject.html ".into(),
        };

        let record = normalize_record(raw).unwrap();
        assert_eq!(record.identifier, "GetObject");
        assert_eq!(record.description, "Grants permission to retrieve objects");
        assert_eq!(record.access_level, "Read");
        assert_eq!(record.resource_types, vec!["object*"]);
        assert_eq!(record.context_keys, vec!["s3:authType"]);
        assert!(record.doc_link.starts_with("https://docs.aws.amazon.com/"));
    }
}
