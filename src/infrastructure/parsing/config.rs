//! Parsing configuration for HTML extraction
//!
//! Centralized configuration for CSS selectors and text patterns.

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use super::{ParsingError, ParsingResult};
use crate::domain::constants::site;

/// Main parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Base URL for resolving detail page hrefs
    pub base_url: String,

    /// Documentation links outside this prefix are dropped
    pub trusted_doc_prefix: String,

    /// Regex a detail page href must match
    pub detail_href_pattern: String,

    /// Regex locating the service prefix in page text (capture group 1)
    pub service_prefix_pattern: String,

    pub selectors: TableSelectors,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            trusted_doc_prefix: site::TRUSTED_DOC_PREFIX.to_string(),
            detail_href_pattern: site::DETAIL_HREF_PATTERN.to_string(),
            service_prefix_pattern: site::SERVICE_PREFIX_PATTERN.to_string(),
            selectors: TableSelectors::default(),
        }
    }
}

impl ParsingConfig {
    /// Default configuration resolving detail pages against `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// CSS selectors used on index and detail pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSelectors {
    pub table: String,
    pub row: String,
    pub link: String,
    pub index_link: String,
}

impl Default for TableSelectors {
    fn default() -> Self {
        Self {
            table: "table".to_string(),
            row: "tr".to_string(),
            link: "a".to_string(),
            index_link: "a[href]".to_string(),
        }
    }
}

/// Compile a selector string, mapping failures to `ParsingError`
pub fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

/// Compile a regex, mapping failures to `ParsingError`
pub fn compile_pattern(pattern: &str) -> ParsingResult<Regex> {
    Regex::new(pattern).map_err(|e| ParsingError::invalid_pattern(pattern, e))
}
