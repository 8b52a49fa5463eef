//! Application configuration for the composition root.
//!
//! # Responsibility
//! - Describe where data lives and which activity type the app declares.
//! - Parse the JSON config shipped alongside the app.
//!
//! # Invariants
//! - The activity type is the first declared entry, or `""` when none is
//!   declared, so an undeclared app still round-trips its own archives.

use crate::activity::codec::ActivityCodec;
use crate::logging::default_log_level;
use crate::store::COLLECTION_ARCHIVE_FILE_NAME;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const RESTORATION_DIR_NAME: &str = "Restoration";

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    RelativeDocumentsDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid app config: {err}"),
            Self::RelativeDocumentsDir(path) => write!(
                f,
                "documents_dir must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::RelativeDocumentsDir(_) => None,
        }
    }
}

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Application-private documents directory.
    pub documents_dir: PathBuf,
    /// Declared activity types; the first one is used for restoration.
    #[serde(default)]
    pub activity_types: Vec<String>,
    #[serde(default = "default_level_string")]
    pub log_level: String,
    /// Log directory. Defaults to `<documents_dir>/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

impl AppConfig {
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            activity_types: Vec::new(),
            log_level: default_level_string(),
            log_dir: None,
        }
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.documents_dir.is_absolute() {
            return Err(ConfigError::RelativeDocumentsDir(self.documents_dir.clone()));
        }
        Ok(())
    }

    pub fn activity_type(&self) -> &str {
        self.activity_types.first().map_or("", String::as_str)
    }

    pub fn codec(&self) -> ActivityCodec {
        ActivityCodec::new(self.activity_type())
    }

    pub fn store_path(&self) -> PathBuf {
        self.documents_dir.join(COLLECTION_ARCHIVE_FILE_NAME)
    }

    pub fn restoration_dir(&self) -> PathBuf {
        self.documents_dir.join(RESTORATION_DIR_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.documents_dir.join("logs"))
    }
}
