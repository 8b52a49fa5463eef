//! Collection archive file format.
//!
//! The archive is a JSON array of `{title, notes, identifier}` objects in
//! display order. Writes go to a sibling temp file first and are renamed over
//! the target, so a crash mid-write leaves the previous archive intact. A failed
//! write removes its temp file.

use super::{StoreError, StoreResult};
use crate::model::item::Item;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Reads the archive at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub(super) fn read_items(path: &Path) -> StoreResult<Option<Vec<Item>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let items = serde_json::from_slice::<Vec<Item>>(&bytes)?;
    Ok(Some(items))
}

/// Replaces the archive at `path` with `items`.
pub(super) fn write_items(path: &Path, items: &[Item]) -> StoreResult<()> {
    let encoded = serde_json::to_vec_pretty(items)?;
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let temp_path = path.with_extension("tmp");
    let written = write_then_rename(&temp_path, path, &encoded);
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written.map_err(io_err)
}

fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}
