//! Service detail page extraction
//!
//! Pulls the service prefix and the action table out of one detail page.

use std::path::Path;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::config::{ParsingConfig, compile_pattern, compile_selector};
use super::grid_table_parser::GridTableParser;
use super::{ContextualParser, ParsingError, ParsingResult, UnitParseContext};
use crate::domain::UnitDocument;
use crate::infrastructure::document_writer::sanitize_file_stem;

/// Number of records echoed to the debug log per page
const PREVIEW_COUNT: usize = 10;

/// Prefix of last resort when neither the page, the name nor the URL yield one
const UNKNOWN_PREFIX: &str = "unknown_service";

pub struct UnitPageExtractor {
    table_selector: Selector,
    prefix_pattern: Regex,
    grid: GridTableParser,
}

impl UnitPageExtractor {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            table_selector: compile_selector(&config.selectors.table)?,
            prefix_pattern: compile_pattern(&config.service_prefix_pattern)?,
            grid: GridTableParser::with_config(config)?,
        })
    }

    /// Service prefix as stated in the page text, e.g. `s3` from
    /// "(service prefix: s3)"
    pub fn find_service_prefix(&self, html: &Html) -> Option<String> {
        let text = html.root_element().text().collect::<String>();
        self.prefix_pattern
            .captures(&text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Prefix from the page, falling back to the sanitized display name and
    /// then to the detail page's file stem (`list_x` for `.../list_x.html`)
    pub fn resolve_prefix(&self, html: &Html, context: &UnitParseContext) -> String {
        if let Some(prefix) = self.find_service_prefix(html) {
            return prefix;
        }

        let fallback = Some(sanitize_file_stem(context.display_name.trim()))
            .filter(|stem| !stem.is_empty())
            .or_else(|| url_file_stem(&context.url))
            .unwrap_or_else(|| UNKNOWN_PREFIX.to_string());
        debug!("No service prefix on page, using '{}'", fallback);
        fallback
    }

    fn find_action_table<'a>(
        &self,
        html: &'a Html,
        context: &UnitParseContext,
    ) -> ParsingResult<ElementRef<'a>> {
        html.select(&self.table_selector)
            .next()
            .ok_or_else(|| ParsingError::NoTableFound {
                url: context.url.clone(),
            })
    }

    /// Lenient extraction: a page without an action table yields a document
    /// with zero records instead of an error.
    pub fn extract(&self, html: &Html, context: &UnitParseContext) -> UnitDocument {
        match self.parse_with_context(html, context) {
            Ok(document) => document,
            Err(e) => {
                warn!("⚠️ {} ({}), continuing with zero actions", e, context.display_name);
                UnitDocument::new(self.resolve_prefix(html, context), Vec::new())
            }
        }
    }
}

impl ContextualParser for UnitPageExtractor {
    type Output = UnitDocument;
    type Context = UnitParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let prefix = self.resolve_prefix(html, context);
        let table = self.find_action_table(html, context)?;
        let records = self.grid.parse_table(table);

        debug!("Service '{}': {} actions found", prefix, records.len());
        for record in records.iter().take(PREVIEW_COUNT) {
            debug!("  {}", record);
        }

        Ok(UnitDocument::new(prefix, records))
    }
}

fn url_file_stem(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;
    let stem = Path::new(segment).file_stem()?.to_string_lossy();
    Some(sanitize_file_stem(&stem)).filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const S3_PAGE: &str = r##"<html><body>
        <h1>Actions, resources, and condition keys for Amazon S3</h1>
        <p>Amazon S3 (service prefix: <code class="code">s3</code>) provides the following resources.</p>
        <table>
          <tr><th>Actions</th><th>Description</th><th>Access level</th><th>Resource types</th><th>Condition keys</th><th>Dependent actions</th></tr>
          <tr><td rowspan="2"><a href="https://docs.aws.amazon.com/AmazonS3/latest/API/API_GetObject.html">GetObject</a></td>
              <td rowspan="2">Grants permission to retrieve objects</td><td rowspan="2">Read</td>
              <td><a href="#object">object*</a></td><td></td><td></td></tr>
          <tr><td></td><td><a href="#authType">s3:authType</a></td><td></td></tr>
        </table>
        <table><tr><th>Resource types</th></tr><tr><td>object</td><td>arn</td></tr></table>
    </body></html>"##;

    fn context(name: &str) -> UnitParseContext {
        UnitParseContext::new(name, "https://docs.aws.amazon.com/service-authorization/latest/reference/list_x.html")
    }

    #[test]
    fn extracts_prefix_and_first_table() {
        let extractor = UnitPageExtractor::new().unwrap();
        let html = Html::parse_document(S3_PAGE);

        let document = extractor.extract(&html, &context("Amazon S3"));
        assert_eq!(document.prefix, "s3");
        assert_eq!(document.records.len(), 1);
        assert_eq!(document.records[0].identifier, "GetObject");
        assert_eq!(document.records[0].context_keys, vec!["s3:authType"]);
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let extractor = UnitPageExtractor::new().unwrap();
        let html = Html::parse_document("<p>AWS Lambda (Service Prefix: lambda)</p>");
        assert_eq!(extractor.find_service_prefix(&html).as_deref(), Some("lambda"));
    }

    #[test]
    fn missing_prefix_falls_back_to_display_name() {
        let extractor = UnitPageExtractor::new().unwrap();
        let html = Html::parse_document(
            "<table><tr><th>Actions</th><th>Description</th></tr><tr><td>Do</td><td>does</td></tr></table>",
        );

        let document = extractor.extract(&html, &context("AWS Example Service"));
        assert_eq!(document.prefix, "AWS_Example_Service");
        assert_eq!(document.records.len(), 1);
    }

    #[test]
    fn blank_display_name_falls_back_to_url_stem() {
        let extractor = UnitPageExtractor::new().unwrap();
        let html = Html::parse_document("<p>No prefix here</p>");

        let document = extractor.extract(&html, &context("   "));
        assert_eq!(document.prefix, "list_x");

        let no_stem = UnitParseContext::new("", "https://docs.aws.amazon.com/");
        assert_eq!(extractor.resolve_prefix(&html, &no_stem), UNKNOWN_PREFIX);
    }

    #[test]
    fn page_without_table_yields_empty_document() {
        let extractor = UnitPageExtractor::new().unwrap();
        let html = Html::parse_document("<p>Amazon Foo (service prefix: foo)</p>");

        assert!(matches!(
            extractor.parse_with_context(&html, &context("Amazon Foo")),
            Err(ParsingError::NoTableFound { .. })
        ));

        let document = extractor.extract(&html, &context("Amazon Foo"));
        assert_eq!(document.prefix, "foo");
        assert!(document.is_empty());
    }
}
