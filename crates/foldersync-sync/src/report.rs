//! Per-pass totals.

use foldersync_core::SyncEvent;

/// What a pass (or a single directory level of it) did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Source-only files copied.
    pub files_copied: usize,
    /// Source-only directories copied.
    pub dirs_copied: usize,
    /// Differing files overwritten.
    pub files_updated: usize,
    /// Replica-only files deleted.
    pub files_removed: usize,
    /// Replica-only directories deleted.
    pub dirs_removed: usize,
    /// Entries replaced because their kind differed.
    pub entries_replaced: usize,
    /// Bytes written to the replica.
    pub bytes_copied: u64,
    /// Directories recursed into.
    pub dirs_visited: usize,
    /// Entries that vanished before their action ran.
    pub skipped: usize,
    /// Entries whose action failed under the skip-entry policy.
    pub failed: usize,
}

impl PassReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a successful action.
    pub fn record(&mut self, event: &SyncEvent, bytes: u64) {
        match event {
            SyncEvent::CopiedFile { .. } => self.files_copied += 1,
            SyncEvent::CopiedDirectory { .. } => self.dirs_copied += 1,
            SyncEvent::UpdatedFile { .. } => self.files_updated += 1,
            SyncEvent::RemovedFile { .. } => self.files_removed += 1,
            SyncEvent::RemovedDirectory { .. } => self.dirs_removed += 1,
            SyncEvent::Replaced { .. } => self.entries_replaced += 1,
            SyncEvent::ReplicaCreated { .. } | SyncEvent::Waiting { .. } | SyncEvent::Stopped => {
                return;
            }
        }
        self.bytes_copied += bytes;
    }

    /// Fold a subdirectory's report into this one.
    pub fn merge(&mut self, other: PassReport) {
        self.files_copied += other.files_copied;
        self.dirs_copied += other.dirs_copied;
        self.files_updated += other.files_updated;
        self.files_removed += other.files_removed;
        self.dirs_removed += other.dirs_removed;
        self.entries_replaced += other.entries_replaced;
        self.bytes_copied += other.bytes_copied;
        self.dirs_visited += other.dirs_visited;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Number of changes made to the replica.
    pub fn mutations(&self) -> usize {
        self.files_copied
            + self.dirs_copied
            + self.files_updated
            + self.files_removed
            + self.dirs_removed
            + self.entries_replaced
    }

    /// Whether every action succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} copied, {} updated, {} removed, {} replaced ({})",
            self.files_copied + self.dirs_copied,
            self.files_updated,
            self.files_removed + self.dirs_removed,
            self.entries_replaced,
            humansize::format_size(self.bytes_copied, humansize::BINARY)
        );
        if self.skipped > 0 {
            summary.push_str(&format!(", {} vanished", self.skipped));
        }
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        summary
    }
}
