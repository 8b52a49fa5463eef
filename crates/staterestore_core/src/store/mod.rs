//! Item collection storage.
//!
//! # Responsibility
//! - Own the ordered item collection and its durable archive file.
//! - Report semantic errors (`NotFound`, `DuplicateIdentifier`) separately
//!   from I/O and archive-format failures.
//!
//! # Invariants
//! - Identifiers are unique within one collection.
//! - Memory and disk are reconciled only by explicit `save`/`load`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod archive;
mod item_store;

pub use item_store::{ItemStore, COLLECTION_ARCHIVE_FILE_NAME};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for collection access and persistence.
#[derive(Debug)]
pub enum StoreError {
    /// No item carries the requested identifier.
    NotFound(String),
    /// Index is outside the current collection bounds.
    IndexOutOfBounds { index: usize, len: usize },
    /// Another item already uses this identifier.
    DuplicateIdentifier(String),
    /// Reading or writing the archive file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Archive bytes are not a valid item collection.
    Archive(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(identifier) => write!(f, "item not found: {identifier}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for collection of {len}")
            }
            Self::DuplicateIdentifier(identifier) => {
                write!(f, "identifier already in collection: {identifier}")
            }
            Self::Io { path, source } => {
                write!(f, "archive I/O failed at `{}`: {source}", path.display())
            }
            Self::Archive(err) => write!(f, "invalid collection archive: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Archive(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Archive(value)
    }
}
