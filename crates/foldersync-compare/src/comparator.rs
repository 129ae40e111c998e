//! One-level comparison of a source/replica directory pair.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use foldersync_core::{Classification, CompareMode, Entry, EntryKind, SyncConfig, SyncError};

use crate::equality::files_equal;

/// Classifies the direct children of two directories.
#[derive(Debug, Clone)]
pub struct TreeComparator {
    mode: CompareMode,
    ignore: GlobSet,
}

impl TreeComparator {
    /// Create a comparator using shallow equality and no ignore patterns.
    pub fn new() -> Self {
        Self {
            mode: CompareMode::default(),
            ignore: GlobSet::empty(),
        }
    }

    /// Build a comparator from a sync configuration.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::new()
            .with_mode(config.compare_mode)
            .with_ignore_patterns(&config.ignore_patterns)
    }

    /// Set the equality test for common files.
    pub fn with_mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ignore entry names matching any of the given glob patterns.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Result<Self, SyncError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| SyncError::InvalidConfig {
                message: format!("Invalid ignore pattern '{pattern}': {e}"),
            })?;
            builder.add(glob);
        }
        self.ignore = builder.build().map_err(|e| SyncError::InvalidConfig {
            message: format!("Invalid ignore patterns: {e}"),
        })?;
        Ok(self)
    }

    /// Check if an entry name is excluded from comparison.
    pub fn is_ignored(&self, name: &OsStr) -> bool {
        !self.ignore.is_empty() && self.ignore.is_match(Path::new(name))
    }

    /// Classify every name found directly under `source` or `replica`.
    ///
    /// Both paths must be directories. Failing to list either one is an
    /// error; failing to inspect a single entry is not.
    pub fn compare(&self, source: &Path, replica: &Path) -> Result<Classification, SyncError> {
        let source_entries = self.list(source)?;
        let mut replica_entries = self.list(replica)?;
        let mut classification = Classification::new();

        for (name, src_kind) in source_entries {
            match replica_entries.remove(&name) {
                None => classification
                    .source_only
                    .push(Entry::source_only(name, src_kind)),
                Some(rep_kind) if src_kind.is_dir() || rep_kind.is_dir() => classification
                    .common_dirs
                    .push(Entry::common(name, src_kind, rep_kind)),
                Some(rep_kind) => {
                    let same = files_equal(&source.join(&name), &replica.join(&name), self.mode);
                    let entry = Entry::common(name, src_kind, rep_kind);
                    if same {
                        classification.common_same.push(entry);
                    } else {
                        classification.common_diff.push(entry);
                    }
                }
            }
        }

        for (name, rep_kind) in replica_entries {
            classification
                .replica_only
                .push(Entry::replica_only(name, rep_kind));
        }

        debug!(
            "Compared {} with {}: {} source-only, {} replica-only, {} dirs, {} same, {} different",
            source.display(),
            replica.display(),
            classification.source_only.len(),
            classification.replica_only.len(),
            classification.common_dirs.len(),
            classification.common_same.len(),
            classification.common_diff.len()
        );

        Ok(classification)
    }

    /// List the direct children of a directory, sorted by name.
    fn list(&self, dir: &Path) -> Result<BTreeMap<OsString, EntryKind>, SyncError> {
        let mut entries = BTreeMap::new();

        for entry in fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))? {
            let entry = entry.map_err(|e| SyncError::io(dir, e))?;
            let name = entry.file_name();
            if self.is_ignored(&name) {
                continue;
            }
            entries.insert(name, entry_kind(&entry));
        }

        Ok(entries)
    }
}

impl Default for TreeComparator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve an entry's kind, following symbolic links.
fn entry_kind(entry: &fs::DirEntry) -> EntryKind {
    match entry.file_type() {
        Ok(ft) if ft.is_dir() => EntryKind::Directory,
        Ok(ft) if ft.is_symlink() => match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            _ => EntryKind::File,
        },
        _ => EntryKind::File,
    }
}
