use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "DocIntake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Documents larger than this are skipped before any OCR call (10 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Score reported when the identifier alone decides the document type.
pub const FILENAME_MATCH_SCORE: u32 = 10;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "docintake=info,warn"
}

/// Get the application data directory.
/// ~/DocIntake/ when a home directory is known, the working directory otherwise.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from("."),
    }
}

/// Default directory for per-document JSON output and the batch summary.
pub fn default_output_dir() -> PathBuf {
    app_data_dir().join("extracted_documents")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Tunables for a batch run. Every field has a default, so a config file only
/// needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_document_bytes: u64,
    /// Lower-case extensions, without the dot.
    pub supported_extensions: Vec<String>,
    pub output_dir: PathBuf,
    pub filename_match_score: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            supported_extensions: ["pdf", "jpg", "jpeg", "png", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_dir: default_output_dir(),
            filename_match_score: FILENAME_MATCH_SCORE,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Extension check on the identifier, case-insensitive.
    pub fn is_supported(&self, identifier: &str) -> bool {
        extension_of(identifier)
            .map(|ext| self.supported_extensions.iter().any(|s| *s == ext))
            .unwrap_or(false)
    }
}

/// Lower-cased text after the last '.', if any.
pub fn extension_of(identifier: &str) -> Option<String> {
    identifier
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && !ext.contains('/'))
}
