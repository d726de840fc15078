//! Configuration infrastructure
//!
//! Contains configuration loading and validation for the harvester.
//!
//! Sources are layered with the `config` crate, later ones winning:
//! 1. Built-in defaults (`defaults` module)
//! 2. Optional `harvester.toml` (path overridable with `HARVESTER_CONFIG`)
//! 3. Environment variables prefixed `HARVESTER`, `__` as section separator
//!    (e.g. `HARVESTER_HARVEST__WORKER_COUNT=8`)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::constants::{output, site};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub harvest: HarvestConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Harvest run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Base URL the detail page hrefs are resolved against
    pub base_url: String,

    /// Index page listing every service
    pub entry_url: String,

    /// Directory receiving one JSON file per service
    pub output_dir: PathBuf,

    /// Worker pool size; `None` uses the host's available parallelism
    pub worker_count: Option<usize>,

    /// Do not write a file for services whose page yields no actions
    pub skip_empty_documents: bool,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    pub follow_redirects: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; `None` places logs next to the executable
    pub log_dir: Option<PathBuf>,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            entry_url: site::ENTRY_URL.to_string(),
            output_dir: PathBuf::from(output::DEFAULT_DIR),
            worker_count: None,
            skip_empty_documents: false,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_file_path();
        Self::from_sources(path.as_deref())
    }

    /// Load configuration from an explicit file (which must exist)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(path).required(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn from_sources(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            info!("Loading configuration file: {:?}", path);
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve which configuration file to read, if any
    fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(defaults::CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        let user = dirs::config_dir()?
            .join(defaults::APP_DIR_NAME)
            .join(defaults::CONFIG_FILE_NAME);
        debug!("Looking for user configuration at {:?}", user);
        user.exists().then_some(user)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Validation {
                message: message.to_string(),
            })
        };

        if self.harvest.entry_url.trim().is_empty() {
            return invalid("harvest.entry_url must not be empty");
        }
        if self.harvest.base_url.trim().is_empty() {
            return invalid("harvest.base_url must not be empty");
        }
        if url::Url::parse(&self.harvest.base_url).is_err() {
            return invalid("harvest.base_url must be an absolute URL");
        }
        if self.harvest.output_dir.as_os_str().is_empty() {
            return invalid("harvest.output_dir must not be empty");
        }
        if self.harvest.worker_count == Some(0) {
            return invalid("harvest.worker_count must be greater than 0");
        }
        if self.http.timeout_seconds == 0 {
            return invalid("http.timeout_seconds must be greater than 0");
        }

        Ok(())
    }

    /// Effective worker pool size
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.harvest.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(defaults::FALLBACK_WORKER_COUNT)
        })
    }
}

/// Default configuration values
pub mod defaults {
    /// Environment variable prefix for overrides
    pub const ENV_PREFIX: &str = "HARVESTER";

    /// Environment variable naming an explicit config file
    pub const CONFIG_PATH_ENV: &str = "HARVESTER_CONFIG";

    /// Config file looked up in the working directory
    pub const CONFIG_FILE_NAME: &str = "harvester.toml";

    /// Directory name under the user config dir
    pub const APP_DIR_NAME: &str = "iam-action-harvester";

    /// Worker pool size when available parallelism cannot be determined
    pub const FALLBACK_WORKER_COUNT: usize = 4;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const USER_AGENT: &str = "iam-action-harvester/0.2";

    // Logging configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "harvester.log";
}
