//! Logging system configuration and initialization
//!
//! This module provides the harvester's logging setup with:
//! - Configuration file based log level control (`RUST_LOG` still wins)
//! - Console output for progress and failure lines
//! - Optional file output through a non-blocking appender
//! - Structured JSON logging for the file layer (optional)

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::Local;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the file writer alive for the life of the process
static LOG_GUARDS: OnceCell<Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>>> =
    OnceCell::new();

/// Local time formatter with millisecond precision
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// `logs/` next to the running binary, or under the working directory as a fallback
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Install the global subscriber with built-in defaults
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Build the env filter for the configured level
///
/// Dependency noise (HTTP client, HTML tokenizer) is capped by
/// `module_filters` unless the level is `trace`. `RUST_LOG` overrides all of it:
/// ```bash
/// RUST_LOG="debug,reqwest=debug,hyper=debug" cargo run
/// ```
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&config.level);

        if !config.level.to_lowercase().contains("trace") {
            let mut modules: Vec<_> = config.module_filters.iter().collect();
            modules.sort();
            for (module, level) in modules {
                match format!("{}={}", module, level).parse() {
                    Ok(directive) => filter = filter.add_directive(directive),
                    Err(e) => eprintln!("Ignoring log filter {}={}: {}", module, level, e),
                }
            }
        }

        filter
    })
}

/// Install the global subscriber described by `config`
///
/// Fails when neither console nor file output is enabled. A second call in the
/// same process (tests) leaves the first subscriber in place.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let registry = Registry::default().with(build_env_filter(config));

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    });

    let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);

    let init_result = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let file_appender = rolling::never(&log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);
        if let Ok(mut guards) = LOG_GUARDS.get_or_init(|| Mutex::new(Vec::new())).lock() {
            guards.push(file_guard);
        }

        if config.json_format {
            let file_layer = fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false);
            registry.with(console_layer).with(file_layer).try_init()
        } else {
            // time + level + message only
            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_target(false)
                .with_ansi(false);
            registry.with(console_layer).with(file_layer).try_init()
        }
    } else {
        registry.with(console_layer).try_init()
    };

    if init_result.is_err() {
        // Already initialized in this process
        return Ok(());
    }

    info!(
        "📝 Logging ready (level={}, console={}, file={})",
        config.level, config.console_output, config.file_output
    );
    if config.file_output {
        info!(
            "Writing {} logs to {:?}",
            if config.json_format { "JSON" } else { "plain" },
            log_dir.join(&config.file_name)
        );
    }

    Ok(())
}

/// One-line banner with crate version and platform
pub fn log_system_info() {
    info!(
        "🖥️ iam-action-harvester v{} on {}/{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if let Ok(dir) = std::env::current_dir() {
        info!("Working directory: {:?}", dir);
    }
}
