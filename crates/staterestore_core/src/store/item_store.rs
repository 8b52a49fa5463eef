//! Ordered item collection backed by one archive file.
//!
//! # Responsibility
//! - Provide CRUD-by-index and lookup-by-identifier over the collection.
//! - Load and save the whole collection as one archive.
//!
//! # Invariants
//! - Mutations never persist implicitly; callers decide when to `save`.
//! - `load`/`save` never fail outward; `try_load`/`try_save` expose errors.
//! - Mutation requires `&mut self`, so one owner serializes all writes.

use super::archive::{read_items, write_items};
use super::{StoreError, StoreResult};
use crate::model::item::Item;
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File name of the collection archive inside the documents directory.
pub const COLLECTION_ARCHIVE_FILE_NAME: &str = "SavedData";

/// In-memory item collection plus its durable location.
#[derive(Debug, Clone)]
pub struct ItemStore {
    items: Vec<Item>,
    location: PathBuf,
}

impl ItemStore {
    /// Opens the store under `documents_dir` and loads any existing archive.
    pub fn open(documents_dir: impl AsRef<Path>) -> Self {
        let mut store = Self::at_path(documents_dir.as_ref().join(COLLECTION_ARCHIVE_FILE_NAME));
        store.load();
        store
    }

    /// Creates an empty store bound to an explicit archive path.
    ///
    /// Nothing is read from disk until `load` is called.
    pub fn at_path(location: impl Into<PathBuf>) -> Self {
        Self {
            items: Vec::new(),
            location: location.into(),
        }
    }

    /// Archive path backing this store.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Replaces memory with the archive contents, falling back to empty.
    ///
    /// A missing archive is the normal first-launch case. Unreadable or
    /// corrupt archives are logged and treated as empty.
    pub fn load(&mut self) {
        if let Err(err) = self.try_load() {
            error!(
                "event=store_load module=store status=error error_code=load_failed fallback=empty error={}",
                err
            );
            self.items.clear();
        }
    }

    /// Replaces memory with the archive contents.
    ///
    /// # Errors
    /// - `StoreError::Io` when the file exists but cannot be read.
    /// - `StoreError::Archive` when the bytes are not an item array.
    pub fn try_load(&mut self) -> StoreResult<()> {
        let started_at = Instant::now();
        let Some(loaded) = read_items(&self.location)? else {
            info!("event=store_load module=store status=ok source=missing count=0");
            self.items.clear();
            return Ok(());
        };

        self.items = dedupe_identifiers(loaded);
        info!(
            "event=store_load module=store status=ok source=file count={} duration_ms={}",
            self.items.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Persists the full collection, logging instead of failing.
    ///
    /// Returns whether the archive was written.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=store_save module=store status=error error_code=save_failed error={}",
                    err
                );
                false
            }
        }
    }

    /// Persists the full collection, overwriting the archive.
    pub fn try_save(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        write_items(&self.location, &self.items)?;
        info!(
            "event=store_save module=store status=ok count={} duration_ms={}",
            self.items.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Iterates items in display order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn item_at(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Returns the first item with `identifier`.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no item matches.
    pub fn item_by_identifier(&self, identifier: &str) -> StoreResult<&Item> {
        self.items
            .iter()
            .find(|item| item.identifier() == identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))
    }

    /// Returns the display index of the item sharing `item`'s identifier.
    pub fn index_of(&self, item: &Item) -> Option<usize> {
        self.position_of(item.identifier())
    }

    /// Inserts `item` at `index`, shifting later items down.
    ///
    /// `index == count()` appends.
    pub fn insert(&mut self, item: Item, index: usize) -> StoreResult<()> {
        self.check_bounds(index, self.items.len() + 1)?;
        self.ensure_unique(item.identifier(), None)?;
        self.items.insert(index, item);
        Ok(())
    }

    pub fn append(&mut self, item: Item) -> StoreResult<()> {
        self.insert(item, self.items.len())
    }

    /// Removes and returns the item at `index`.
    pub fn remove_at(&mut self, index: usize) -> StoreResult<Item> {
        self.check_bounds(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Replaces the item at `index` and returns the previous one.
    ///
    /// The replacement may keep the slot's identifier or bring a new one, but
    /// may not reuse an identifier held by another slot.
    pub fn replace_at(&mut self, index: usize, item: Item) -> StoreResult<Item> {
        self.check_bounds(index, self.items.len())?;
        self.ensure_unique(item.identifier(), Some(index))?;
        Ok(std::mem::replace(&mut self.items[index], item))
    }

    /// Moves one item from `from` to `to`, as a list row reorder does.
    pub fn move_item(&mut self, from: usize, to: usize) -> StoreResult<()> {
        self.check_bounds(from, self.items.len())?;
        self.check_bounds(to, self.items.len())?;
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    /// Applies an edited item over its stored baseline and persists.
    ///
    /// Returns the index of the replaced row. The save itself is best-effort.
    pub fn commit_edit(&mut self, item: Item) -> StoreResult<usize> {
        let index = self
            .position_of(item.identifier())
            .ok_or_else(|| StoreError::NotFound(item.identifier().to_string()))?;
        self.items[index] = item;
        self.save();
        Ok(index)
    }

    /// Builds the next default item (`Item {n}` / `Item {n} notes`).
    ///
    /// The item is not inserted.
    pub fn next_default_item(&self) -> Item {
        default_item(self.items.len() + 1)
    }

    /// Fills an empty store with `count` default items and persists them.
    ///
    /// Returns whether seeding happened.
    pub fn seed_if_empty(&mut self, count: usize) -> bool {
        if !self.items.is_empty() {
            return false;
        }
        self.items.extend((1..=count).map(default_item));
        info!("event=store_seed module=store status=ok count={}", count);
        self.save();
        true
    }

    fn position_of(&self, identifier: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|candidate| candidate.identifier() == identifier)
    }

    fn check_bounds(&self, index: usize, limit: usize) -> StoreResult<()> {
        if index < limit {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
        }
    }

    fn ensure_unique(&self, identifier: &str, replacing: Option<usize>) -> StoreResult<()> {
        match self.position_of(identifier) {
            Some(existing) if Some(existing) != replacing => {
                Err(StoreError::DuplicateIdentifier(identifier.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn default_item(number: usize) -> Item {
    Item::new(format!("Item {number}"), format!("Item {number} notes"))
}

fn dedupe_identifiers(items: Vec<Item>) -> Vec<Item> {
    let loaded = items.len();
    let mut seen = HashSet::with_capacity(loaded);
    let unique: Vec<Item> = items
        .into_iter()
        .filter(|item| seen.insert(item.identifier().to_string()))
        .collect();
    if unique.len() != loaded {
        warn!(
            "event=store_load module=store status=degraded dropped_duplicates={}",
            loaded - unique.len()
        );
    }
    unique
}
