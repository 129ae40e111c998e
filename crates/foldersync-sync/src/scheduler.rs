//! Periodic pass scheduling.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use foldersync_core::{SyncConfig, SyncError, SyncEvent, SyncObserver};

use crate::reconcile::Reconciler;
use crate::report::PassReport;

/// Lifecycle state of a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SchedulerState {
    /// Passes are being run.
    Running,
    /// Terminal; no further passes will run.
    Stopped,
}

/// Runs a full synchronization pass, waits, and repeats.
///
/// A scheduler only exists once its preconditions hold: [`Scheduler::start`]
/// fails without running anything if the source is missing.
pub struct Scheduler {
    config: SyncConfig,
    reconciler: Reconciler,
    observer: Arc<dyn SyncObserver>,
    state: SchedulerState,
    passes: u64,
}

impl Scheduler {
    /// Validate the configuration, create the replica if needed, and enter
    /// the running state.
    ///
    /// Configuration errors are reported to the observer before being
    /// returned.
    pub fn start(config: SyncConfig, observer: Arc<dyn SyncObserver>) -> Result<Self, SyncError> {
        let prepared = Reconciler::from_config(&config, observer.clone())
            .and_then(|reconciler| prepare(&config, observer.as_ref()).map(|()| reconciler));

        match prepared {
            Ok(reconciler) => Ok(Self {
                config,
                reconciler,
                observer,
                state: SchedulerState::Running,
                passes: 0,
            }),
            Err(error) => {
                observer.on_error(&error);
                Err(error)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of passes completed so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run one full pass from the root directory pair.
    ///
    /// The pass runs on a blocking thread and cannot be interrupted midway.
    pub async fn run_pass(&mut self) -> Result<PassReport, SyncError> {
        let reconciler = self.reconciler.clone();
        let source = self.config.source.clone();
        let replica = self.config.replica.clone();

        let report = tokio::task::spawn_blocking(move || reconciler.sync_dir(&source, &replica))
            .await
            .map_err(|e| SyncError::Task {
                message: e.to_string(),
            })??;

        self.passes += 1;
        debug!("Pass {} complete: {}", self.passes, report.summary());
        Ok(report)
    }

    /// Run passes until `shutdown` is cancelled or a pass fails.
    ///
    /// Cancellation is checked after each pass and during the wait between
    /// passes. Returns the number of completed passes on a requested stop.
    /// A failed pass is reported to the observer and returned; it is not
    /// retried. A stopped scheduler returns immediately.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<u64, SyncError> {
        while self.state == SchedulerState::Running {
            if let Err(error) = self.run_pass().await {
                self.state = SchedulerState::Stopped;
                self.observer.on_error(&error);
                return Err(error);
            }

            if shutdown.is_cancelled() {
                self.stop();
                break;
            }

            self.observer.on_event(&SyncEvent::Waiting {
                interval: self.config.interval,
            });

            tokio::select! {
                _ = shutdown.cancelled() => self.stop(),
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        Ok(self.passes)
    }

    fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
        self.observer.on_event(&SyncEvent::Stopped);
    }
}

/// Check the source, create the replica if absent, and reject overlapping
/// trees.
fn prepare(config: &SyncConfig, observer: &dyn SyncObserver) -> Result<(), SyncError> {
    match fs::metadata(&config.source) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(SyncError::NotADirectory {
                path: config.source.clone(),
            });
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::SourceMissing {
                path: config.source.clone(),
            });
        }
        Err(e) => return Err(SyncError::io(&config.source, e)),
    }

    match fs::metadata(&config.replica) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(SyncError::NotADirectory {
                path: config.replica.clone(),
            });
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            check_overlap(&config.source, &config.replica)?;
            fs::create_dir_all(&config.replica).map_err(|e| SyncError::io(&config.replica, e))?;
            observer.on_event(&SyncEvent::ReplicaCreated {
                replica: config.replica.clone(),
            });
        }
        Err(e) => return Err(SyncError::io(&config.replica, e)),
    }

    check_overlap(&config.source, &config.replica)
}

/// Neither tree may contain the other.
fn check_overlap(source: &Path, replica: &Path) -> Result<(), SyncError> {
    let source = resolve(source)?;
    let replica = resolve(replica)?;

    if replica.starts_with(&source) || source.starts_with(&replica) {
        return Err(SyncError::InvalidConfig {
            message: format!(
                "Source {} and replica {} overlap",
                source.display(),
                replica.display()
            ),
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and append the rest,
/// folding `..` in the part that does not exist yet.
fn resolve(path: &Path) -> Result<PathBuf, SyncError> {
    let absolute = std::path::absolute(path).map_err(|e| SyncError::io(path, e))?;

    let mut pending = Vec::new();
    let mut current = absolute.as_path();
    let mut resolved = loop {
        match current.canonicalize() {
            Ok(resolved) => break resolved,
            Err(e) => {
                let Some(parent) = current.parent() else {
                    return Err(SyncError::io(path, e));
                };
                pending.extend(current.components().next_back());
                current = parent;
            }
        }
    };

    for component in pending.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}
