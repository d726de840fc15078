use serde::{Deserialize, Serialize};
use std::fmt;

/// 서비스 인덱스 페이지에서 발견된 하나의 서비스
///
/// `detail_url` is always absolute; only links matching the detail page
/// naming pattern become units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceUnit {
    /// Visible link text on the index page (e.g. "Amazon S3")
    pub display_name: String,
    /// Absolute URL of the service's detail page
    pub detail_url: String,
}

impl ServiceUnit {
    pub fn new(display_name: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            detail_url: detail_url.into(),
        }
    }
}

impl AsRef<str> for ServiceUnit {
    fn as_ref(&self) -> &str {
        &self.detail_url
    }
}

impl fmt::Display for ServiceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.detail_url)
    }
}
