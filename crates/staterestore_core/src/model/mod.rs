//! Persisted domain records.
//!
//! # Responsibility
//! - Define the item shape shared by the collection archive and the
//!   restoration path.
//!
//! # Invariants
//! - Every item carries a stable string identifier.
//! - Identity comparisons go through the identifier, not title/notes.

pub mod item;
