//! Test utilities for the harvester
//!
//! In-memory page fetcher and HTML fixtures so harvest tests never touch the
//! network.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::infrastructure::{AppConfig, FetchError, PageFetcher};

/// Base URL used by fixture configurations
pub const TEST_BASE_URL: &str = "https://docs.example.test/reference/";

/// `PageFetcher` serving canned pages; unknown URLs answer 404
#[derive(Debug, Clone, Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
    statuses: HashMap<String, u16>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Make `url` answer with a non-success status
    #[must_use]
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(status) = self.statuses.get(url) {
            return Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            });
        }
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Index page linking each `(display name, href)` pair
pub fn index_page(links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(name, href)| format!("<li><a href=\"{href}\">{name}</a></li>\n"))
        .collect();
    format!(
        "<html><body><a href=\"reference.html\">Reference</a><ul>\n{items}</ul></body></html>"
    )
}

/// Detail page with the given prefix and one single-row action per name
pub fn detail_page(prefix: &str, actions: &[&str]) -> String {
    let rows: String = actions
        .iter()
        .map(|action| {
            format!(
                "<tr><td><a href=\"https://docs.aws.amazon.com/{prefix}/{action}.html\">{action}</a></td>\
                 <td>Grants permission to {action}</td><td>Write</td>\
                 <td><a href=\"#res\">resource*</a></td><td></td><td></td></tr>\n"
            )
        })
        .collect();
    format!(
        "<html><body><p>Example (service prefix: {prefix}) provides the following actions.</p>\
         <table><tr><th>Actions</th><th>Description</th><th>Access level</th>\
         <th>Resource types (*required)</th><th>Condition keys</th><th>Dependent actions</th></tr>\n\
         {rows}</table></body></html>"
    )
}

/// Configuration writing into `<dir>/out` with a small fixed pool
pub fn test_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.harvest.base_url = TEST_BASE_URL.to_string();
    config.harvest.entry_url = format!("{TEST_BASE_URL}index.html");
    config.harvest.output_dir = dir.join("out");
    config.harvest.worker_count = Some(2);
    config
}
