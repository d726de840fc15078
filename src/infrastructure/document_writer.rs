//! Filesystem output for harvested documents
//!
//! One UTF-8 JSON file per service, named after the sanitized prefix.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::domain::UnitDocument;
use crate::domain::constants::output::{FILE_EXTENSION, ILLEGAL_FILENAME_CHARS};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to create output directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize document '{prefix}': {source}")]
    Serialize {
        prefix: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replace characters that are illegal (or awkward) in file names with `_`
#[must_use]
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Writes `UnitDocument`s into a single output directory
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    output_dir: PathBuf,
}

impl DocumentWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist yet
    pub async fn ensure_output_dir(&self) -> Result<(), WriteError> {
        if !self.output_dir.exists() {
            info!("📁 Creating output directory: {:?}", self.output_dir);
        }
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: self.output_dir.clone(),
                source,
            })
    }

    /// Target path for a document with the given prefix
    #[must_use]
    pub fn output_path(&self, prefix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", sanitize_file_stem(prefix), FILE_EXTENSION))
    }

    /// Serialize and write one document, returning the written path.
    /// An existing file with the same name is overwritten.
    pub async fn write(&self, document: &UnitDocument) -> Result<PathBuf, WriteError> {
        let path = self.output_path(&document.prefix);
        let json = document
            .to_json_pretty()
            .map_err(|source| WriteError::Serialize {
                prefix: document.prefix.clone(),
                source,
            })?;

        fs::write(&path, json)
            .await
            .map_err(|source| WriteError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {} actions to {:?}", document.records.len(), path);
        Ok(path)
    }
}
