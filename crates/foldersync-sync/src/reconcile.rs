//! Recursive reconciliation of a source/replica directory pair.

use std::path::Path;
use std::sync::Arc;

use foldersync_compare::TreeComparator;
use foldersync_core::{
    Classification, EntryKind, ErrorPolicy, SyncConfig, SyncError, SyncEvent, SyncObserver,
};
use foldersync_ops::{copy_file, copy_tree, remove_file, remove_tree, replace_entry};

use crate::report::PassReport;

/// Outcome of one entry action: the event to report and the bytes written.
type ActionResult = Result<(SyncEvent, u64), SyncError>;

/// Applies classifications to the replica, one directory level at a time.
///
/// Each level is compared fresh and returns its own [`PassReport`]; parents
/// merge the reports of the subdirectories they recurse into.
#[derive(Clone)]
pub struct Reconciler {
    comparator: TreeComparator,
    observer: Arc<dyn SyncObserver>,
    policy: ErrorPolicy,
}

impl Reconciler {
    /// Create a reconciler with the default (abort-pass) error policy.
    pub fn new(comparator: TreeComparator, observer: Arc<dyn SyncObserver>) -> Self {
        Self {
            comparator,
            observer,
            policy: ErrorPolicy::default(),
        }
    }

    /// Build a reconciler from a sync configuration.
    pub fn from_config(
        config: &SyncConfig,
        observer: Arc<dyn SyncObserver>,
    ) -> Result<Self, SyncError> {
        let comparator = TreeComparator::from_config(config)?;
        Ok(Self::new(comparator, observer).with_policy(config.error_policy))
    }

    /// Set how failed entry actions are handled.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Compare a directory pair and bring the replica in line with the
    /// source, recursing into common subdirectories.
    pub fn sync_dir(&self, source: &Path, replica: &Path) -> Result<PassReport, SyncError> {
        let classification = self.comparator.compare(source, replica)?;
        let mut report = self.reconcile(source, replica, &classification)?;
        report.dirs_visited += 1;
        Ok(report)
    }

    /// Apply one level's classification.
    ///
    /// Actions run in this order: source-only copies, replica-only removals,
    /// common directories, differing files. Names are ascending within each
    /// group.
    pub fn reconcile(
        &self,
        source: &Path,
        replica: &Path,
        classification: &Classification,
    ) -> Result<PassReport, SyncError> {
        let mut report = PassReport::new();

        for entry in &classification.source_only {
            let src = source.join(&entry.name);
            let dst = replica.join(&entry.name);
            let result = match entry.source {
                Some(EntryKind::Directory) => copy_tree(&src, &dst).map(|stats| {
                    let event = SyncEvent::CopiedDirectory {
                        source: src,
                        replica: dst,
                    };
                    (event, stats.bytes)
                }),
                _ => copy_file(&src, &dst).map(|bytes| {
                    let event = SyncEvent::CopiedFile {
                        source: src,
                        replica: dst,
                    };
                    (event, bytes)
                }),
            };
            self.settle(result, &mut report)?;
        }

        for entry in &classification.replica_only {
            let dst = replica.join(&entry.name);
            let result = match entry.replica {
                Some(EntryKind::Directory) => remove_tree(&dst)
                    .map(|()| (SyncEvent::RemovedDirectory { replica: dst }, 0)),
                _ => remove_file(&dst).map(|()| (SyncEvent::RemovedFile { replica: dst }, 0)),
            };
            self.settle(result, &mut report)?;
        }

        for entry in &classification.common_dirs {
            let src = source.join(&entry.name);
            let dst = replica.join(&entry.name);
            match (entry.source, entry.replica) {
                (Some(src_kind), Some(dst_kind)) if src_kind != dst_kind => {
                    let result = replace_entry(&src, src_kind, &dst, dst_kind).map(|stats| {
                        let event = SyncEvent::Replaced {
                            source: src,
                            replica: dst,
                        };
                        (event, stats.bytes)
                    });
                    self.settle(result, &mut report)?;
                }
                _ => match self.sync_dir(&src, &dst) {
                    Ok(child) => report.merge(child),
                    Err(error) => self.absorb(error, &mut report)?,
                },
            }
        }

        for entry in &classification.common_diff {
            let src = source.join(&entry.name);
            let dst = replica.join(&entry.name);
            let result = copy_file(&src, &dst).map(|bytes| {
                let event = SyncEvent::UpdatedFile {
                    source: src,
                    replica: dst,
                };
                (event, bytes)
            });
            self.settle(result, &mut report)?;
        }

        Ok(report)
    }

    /// Report and count an action's outcome.
    fn settle(&self, result: ActionResult, report: &mut PassReport) -> Result<(), SyncError> {
        match result {
            Ok((event, bytes)) => {
                self.observer.on_event(&event);
                report.record(&event, bytes);
                Ok(())
            }
            Err(error) => self.absorb(error, report),
        }
    }

    /// Decide whether a failed action ends the pass.
    ///
    /// Vanished entries are always skipped. Anything else follows the error
    /// policy; errors that abort the pass are left for the scheduler to log.
    fn absorb(&self, error: SyncError, report: &mut PassReport) -> Result<(), SyncError> {
        if error.is_not_found() {
            self.observer.on_error(&error);
            report.skipped += 1;
            return Ok(());
        }

        match self.policy {
            ErrorPolicy::AbortPass => Err(error),
            ErrorPolicy::SkipEntry => {
                self.observer.on_error(&error);
                report.failed += 1;
                Ok(())
            }
        }
    }
}
