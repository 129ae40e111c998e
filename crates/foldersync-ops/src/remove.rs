//! Removal and replacement of replica entries.

use std::fs;
use std::path::Path;

use tracing::debug;

use foldersync_core::{EntryKind, SyncError};

use crate::copy::{CopyStats, copy_file, copy_tree};

/// Delete a single file.
pub fn remove_file(path: &Path) -> Result<(), SyncError> {
    fs::remove_file(path).map_err(|e| SyncError::io(path, e))
}

/// Delete a directory and everything beneath it.
///
/// A symbolic link is removed itself; its target is left alone.
pub fn remove_tree(path: &Path) -> Result<(), SyncError> {
    fs::remove_dir_all(path).map_err(|e| SyncError::io(path, e))
}

/// Delete an entry of the given kind.
pub fn remove_entry(path: &Path, kind: EntryKind) -> Result<(), SyncError> {
    match kind {
        EntryKind::Directory => remove_tree(path),
        EntryKind::File => remove_file(path),
    }
}

/// Replace `dest` (of kind `dest_kind`) with a copy of `source` (of kind
/// `source_kind`).
///
/// Used when the two sides hold the same name with different kinds. The
/// replica entry is deleted first, then the source entry is copied in.
pub fn replace_entry(
    source: &Path,
    source_kind: EntryKind,
    dest: &Path,
    dest_kind: EntryKind,
) -> Result<CopyStats, SyncError> {
    debug!(
        "Replacing {} {} with {} {}",
        dest_kind,
        dest.display(),
        source_kind,
        source.display()
    );

    remove_entry(dest, dest_kind)?;

    match source_kind {
        EntryKind::Directory => copy_tree(source, dest),
        EntryKind::File => copy_file(source, dest).map(CopyStats::file),
    }
}
