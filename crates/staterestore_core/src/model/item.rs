//! Item domain model.
//!
//! # Responsibility
//! - Define the note-like record persisted in the collection archive.
//! - Generate stable identifiers for newly created items.
//!
//! # Invariants
//! - `identifier` is set once at construction and never mutated afterwards.
//! - Serialized field names are `title`, `notes`, `identifier`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted note-like record.
///
/// `title` and `notes` are freely editable. The identifier is private so the
/// only way to change it is to build a different item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display title shown in list rows.
    pub title: String,
    /// Free-form body text.
    pub notes: String,
    identifier: String,
}

impl Item {
    /// Creates an item with a freshly generated identifier.
    pub fn new(title: impl Into<String>, notes: impl Into<String>) -> Self {
        Self::with_identifier(title, notes, generate_identifier())
    }

    /// Creates an item with a caller-provided identifier.
    ///
    /// Used when identity already exists, e.g. when rebuilding a transient
    /// view of a stored item from restored edit text.
    pub fn with_identifier(
        title: impl Into<String>,
        notes: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            notes: notes.into(),
            identifier: identifier.into(),
        }
    }

    /// Creates an item, generating an identifier only when none is given.
    pub fn with_optional_identifier(
        title: impl Into<String>,
        notes: impl Into<String>,
        identifier: Option<String>,
    ) -> Self {
        match identifier {
            Some(identifier) => Self::with_identifier(title, notes, identifier),
            None => Self::new(title, notes),
        }
    }

    /// Stable identifier of this item.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns whether title or notes differ from `baseline`.
    ///
    /// Comparison is exact and case-sensitive.
    pub fn differs_from(&self, baseline: &Item) -> bool {
        self.title != baseline.title || self.notes != baseline.notes
    }
}

fn generate_identifier() -> String {
    Uuid::new_v4().to_string()
}
