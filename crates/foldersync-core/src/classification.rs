//! Per-directory classification of entry names.

use std::ffi::{OsStr, OsString};

use serde::{Deserialize, Serialize};

/// Kind of a directory entry, resolved by following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum EntryKind {
    /// Anything that is not a directory.
    #[strum(to_string = "file")]
    File,
    /// Directory.
    #[strum(to_string = "directory")]
    Directory,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// A name seen in at least one of the two directories being compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// File or directory name (not a full path).
    pub name: OsString,
    /// Kind on the source side, `None` if absent there.
    pub source: Option<EntryKind>,
    /// Kind on the replica side, `None` if absent there.
    pub replica: Option<EntryKind>,
}

impl Entry {
    /// Create an entry present only in source.
    pub fn source_only(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            source: Some(kind),
            replica: None,
        }
    }

    /// Create an entry present only in replica.
    pub fn replica_only(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            source: None,
            replica: Some(kind),
        }
    }

    /// Create an entry present on both sides.
    pub fn common(name: impl Into<OsString>, source: EntryKind, replica: EntryKind) -> Self {
        Self {
            name: name.into(),
            source: Some(source),
            replica: Some(replica),
        }
    }

    /// The entry name.
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Whether both sides hold the same name with different kinds.
    pub fn is_kind_mismatch(&self) -> bool {
        matches!((self.source, self.replica), (Some(s), Some(r)) if s != r)
    }
}

/// Classification of the direct children of a source/replica directory pair.
///
/// Every name in the union of both listings lands in exactly one list. Lists
/// are sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Present only in source.
    pub source_only: Vec<Entry>,
    /// Present only in replica.
    pub replica_only: Vec<Entry>,
    /// Present on both sides with at least one side a directory.
    pub common_dirs: Vec<Entry>,
    /// Files on both sides considered equal.
    pub common_same: Vec<Entry>,
    /// Files on both sides considered different.
    pub common_diff: Vec<Entry>,
}

impl Classification {
    /// Create an empty classification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of classified names.
    pub fn len(&self) -> usize {
        self.source_only.len()
            + self.replica_only.len()
            + self.common_dirs.len()
            + self.common_same.len()
            + self.common_diff.len()
    }

    /// Whether both directories were empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every classified entry.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.source_only
            .iter()
            .chain(&self.replica_only)
            .chain(&self.common_dirs)
            .chain(&self.common_same)
            .chain(&self.common_diff)
    }

    /// Look up an entry by name.
    pub fn find(&self, name: impl AsRef<OsStr>) -> Option<&Entry> {
        let name = name.as_ref();
        self.entries().find(|e| e.name.as_os_str() == name)
    }

    /// Whether this level needs no action besides recursing into common
    /// directories of matching kind.
    pub fn is_level_in_sync(&self) -> bool {
        self.source_only.is_empty()
            && self.replica_only.is_empty()
            && self.common_diff.is_empty()
            && !self.common_dirs.iter().any(Entry::is_kind_mismatch)
    }
}
