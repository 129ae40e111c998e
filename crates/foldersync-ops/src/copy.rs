//! File and directory copies that preserve timestamps.

use std::fs::{self, Metadata};
use std::path::Path;

use filetime::FileTime;

use foldersync_core::SyncError;

/// Totals for a completed copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written.
    pub files: u64,
    /// Directories created.
    pub dirs: u64,
    /// Bytes written.
    pub bytes: u64,
}

impl CopyStats {
    /// Stats for a single copied file.
    pub fn file(bytes: u64) -> Self {
        Self {
            files: 1,
            dirs: 0,
            bytes,
        }
    }

    /// Add another copy's totals to this one.
    pub fn add(&mut self, other: CopyStats) {
        self.files += other.files;
        self.dirs += other.dirs;
        self.bytes += other.bytes;
    }
}

/// Copy a single file, overwriting `dest` if it exists.
///
/// Content and permissions are copied, then access and modification times
/// are set to the source's.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64, SyncError> {
    let metadata = fs::metadata(source).map_err(|e| SyncError::io(source, e))?;

    let bytes = fs::copy(source, dest).map_err(|e| copy_error(source, dest, e))?;
    preserve_times(dest, &metadata)?;

    Ok(bytes)
}

/// Recursively copy a directory to `dest`, which must not exist yet.
///
/// Symbolic links are followed. Directory permissions and timestamps are
/// applied after the directory's contents are written.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<CopyStats, SyncError> {
    let metadata = fs::metadata(source).map_err(|e| SyncError::io(source, e))?;

    fs::create_dir(dest).map_err(|e| SyncError::io(dest, e))?;

    let mut stats = CopyStats {
        dirs: 1,
        ..CopyStats::default()
    };

    let entries = fs::read_dir(source).map_err(|e| SyncError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io(source, e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if path.is_dir() {
            stats.add(copy_tree(&path, &dest_path)?);
        } else {
            stats.add(CopyStats::file(copy_file(&path, &dest_path)?));
        }
    }

    fs::set_permissions(dest, metadata.permissions()).map_err(|e| SyncError::io(dest, e))?;
    preserve_times(dest, &metadata)?;

    Ok(stats)
}

/// Attribute a failed copy to the side that caused it.
///
/// The source was readable just before the copy, so it is only blamed if it
/// has since disappeared.
fn copy_error(source: &Path, dest: &Path, error: std::io::Error) -> SyncError {
    if source.exists() {
        SyncError::io(dest, error)
    } else {
        SyncError::io(source, error)
    }
}

/// Set `dest`'s access and modification times from `metadata`.
fn preserve_times(dest: &Path, metadata: &Metadata) -> Result<(), SyncError> {
    let atime = FileTime::from_last_access_time(metadata);
    let mtime = FileTime::from_last_modification_time(metadata);
    filetime::set_file_times(dest, atime, mtime).map_err(|e| SyncError::io(dest, e))
}
