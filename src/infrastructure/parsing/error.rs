//! Parsing error types
//!
//! Selector and pattern errors come from configuration and are fatal for the
//! whole run. A page without an action table is recoverable: the service is
//! harvested with zero actions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No action table found on {url}")]
    NoTableFound { url: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed { url: String, reason: String },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_pattern(pattern: &str, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if harvesting can continue past this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NoTableFound { .. } | Self::UrlResolutionFailed { .. } => true,
            Self::InvalidSelector { .. } | Self::InvalidPattern { .. } => false,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
