//! HTML parsing infrastructure
//!
//! Trait-based parsers for the service index page and the per-service
//! detail pages, built on `scraper`.

pub mod config;
pub mod context;
pub mod error;
pub mod grid_table_parser;
pub mod record_normalizer;
pub mod service_index_parser;
pub mod unit_page_extractor;

// Re-export public types
pub use config::ParsingConfig;
pub use context::{ParseContext, UnitParseContext};
pub use error::{ParsingError, ParsingResult};
pub use grid_table_parser::{GridCell, GridTableParser, RowSpanCarry};
pub use record_normalizer::{RawRecord, normalize_record};
pub use service_index_parser::ServiceIndexParser;
pub use unit_page_extractor::UnitPageExtractor;

use scraper::Html;

/// Parser that needs information beyond the document itself
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}
