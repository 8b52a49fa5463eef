//! Edit-context snapshots for restoration.
//!
//! # Responsibility
//! - Capture "what the user was editing" from on-screen text plus the
//!   stored baseline.
//! - Carry that snapshot through the archive codec.
//!
//! # Invariants
//! - Dirty detection uses exact, case-sensitive string equality.
//! - Records are plain data; only the codec gives them a durable form.

pub mod codec;

use crate::model::item::Item;
use crate::store::ItemStore;
use log::debug;

/// On-screen edit state reported by the UI layer at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditContext {
    /// Identifier of the item being shown.
    pub identifier: String,
    /// Current title field text.
    pub title_text: String,
    /// Current notes field text.
    pub notes_text: String,
    /// Whether the view is explicitly in edit mode.
    pub edit_mode_active: bool,
}

/// Snapshot of an in-progress edit, consumed by the restoration path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityRecord {
    pub target_identifier: Option<String>,
    pub pending_title: Option<String>,
    pub pending_notes: Option<String>,
    pub was_editing: bool,
}

impl ActivityRecord {
    /// Captures `context` against the store's current baseline.
    ///
    /// Text that differs from the baseline marks the record as editing, as
    /// does an explicit edit mode. An identifier the store no longer knows has
    /// no baseline, so its text counts as unsaved.
    pub fn capture(store: &ItemStore, context: &EditContext) -> Self {
        let pending = Item::with_identifier(
            context.title_text.as_str(),
            context.notes_text.as_str(),
            context.identifier.as_str(),
        );
        let text_dirty = match store.item_by_identifier(pending.identifier()) {
            Ok(baseline) => pending.differs_from(baseline),
            Err(_) => true,
        };
        let was_editing = text_dirty || context.edit_mode_active;
        debug!(
            "event=activity_capture module=activity status=ok text_dirty={} edit_mode={}",
            text_dirty, context.edit_mode_active
        );

        Self {
            target_identifier: Some(pending.identifier().to_string()),
            pending_title: Some(pending.title),
            pending_notes: Some(pending.notes),
            was_editing,
        }
    }

    /// Builds the transient item shown after restoration.
    ///
    /// Pending text wins over `baseline`; missing pending fields fall back to
    /// the baseline values. The baseline identifier is always kept.
    pub fn restored_item(&self, baseline: &Item) -> Item {
        Item::with_identifier(
            self.pending_title
                .clone()
                .unwrap_or_else(|| baseline.title.clone()),
            self.pending_notes
                .clone()
                .unwrap_or_else(|| baseline.notes.clone()),
            baseline.identifier(),
        )
    }
}
