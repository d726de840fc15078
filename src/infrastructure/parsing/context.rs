//! Parsing context for HTML extraction
//!
//! Provides context objects carried into parsing operations.

/// Context for parsing the service index page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Base URL for resolving detail page hrefs
    pub base_url: String,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// Context for parsing one service's detail page
#[derive(Debug, Clone)]
pub struct UnitParseContext {
    /// Index link text of the service, used for the prefix fallback
    pub display_name: String,

    /// URL the page was fetched from
    pub url: String,
}

impl UnitParseContext {
    /// Create new detail parse context
    pub fn new(display_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            url: url.into(),
        }
    }
}

impl From<&crate::domain::ServiceUnit> for UnitParseContext {
    fn from(unit: &crate::domain::ServiceUnit) -> Self {
        Self::new(unit.display_name.clone(), unit.detail_url.clone())
    }
}
