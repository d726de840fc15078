//! Infrastructure layer for HTTP access, parsing, file output and the
//! ambient configuration/logging setup.

pub mod config; // Layered configuration (defaults, file, environment)
pub mod document_writer; // JSON output files
pub mod http_client; // reqwest-backed page fetching
pub mod logging; // tracing subscriber setup
pub mod parsing; // Index and detail page parsers

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, HarvestConfig, HttpConfig, LoggingConfig};
pub use document_writer::{DocumentWriter, WriteError, sanitize_file_stem};
pub use http_client::{FetchError, HttpClient, PageFetcher};
pub use logging::{get_log_directory, init_logging, init_logging_with_config, log_system_info};
pub use parsing::{
    ContextualParser, GridTableParser, ParseContext, ParsingConfig, ParsingError, ParsingResult,
    ServiceIndexParser, UnitPageExtractor, UnitParseContext,
};
