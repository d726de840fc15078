//! Service index page parser
//!
//! The index lists one link per service; detail pages are the hrefs shaped
//! like `list_*.html`, optionally prefixed with `./`.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::config::{ParsingConfig, compile_pattern, compile_selector};
use super::record_normalizer::normalize_text;
use super::{ContextualParser, ParseContext, ParsingError, ParsingResult};
use crate::domain::ServiceUnit;

pub struct ServiceIndexParser {
    link_selector: Selector,
    href_pattern: Regex,
}

impl ServiceIndexParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            link_selector: compile_selector(&config.selectors.index_link)?,
            href_pattern: compile_pattern(&config.detail_href_pattern)?,
        })
    }

    /// Collect every detail page linked from the index, in document order
    pub fn discover(&self, html: &Html, context: &ParseContext) -> Vec<ServiceUnit> {
        let mut units = Vec::new();

        for link in html.select(&self.link_selector) {
            let Some(href) = link.value().attr("href").map(str::trim) else {
                continue;
            };
            if !self.href_pattern.is_match(href) {
                continue;
            }

            match resolve_detail_url(&context.base_url, href) {
                Ok(detail_url) => {
                    let display_name = normalize_text(&link.text().collect::<String>());
                    units.push(ServiceUnit::new(display_name, detail_url));
                }
                Err(e) => warn!("Skipping index link: {}", e),
            }
        }

        debug!("Discovered {} service pages", units.len());
        units
    }
}

/// Join a relative detail href onto the base URL
pub fn resolve_detail_url(base_url: &str, href: &str) -> ParsingResult<String> {
    let relative = href.strip_prefix("./").unwrap_or(href);
    let joined = format!("{base_url}{relative}");
    url::Url::parse(&joined).map_err(|e| ParsingError::UrlResolutionFailed {
        url: joined.clone(),
        reason: e.to_string(),
    })?;
    Ok(joined)
}

impl ContextualParser for ServiceIndexParser {
    type Output = Vec<ServiceUnit>;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        Ok(self.discover(html, context))
    }
}
