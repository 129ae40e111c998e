//! Observable synchronization events.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SyncError;

/// Something the synchronizer did, reported to a [`SyncObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A source-only file was copied into the replica.
    CopiedFile { source: PathBuf, replica: PathBuf },
    /// A source-only directory was copied into the replica with its contents.
    CopiedDirectory { source: PathBuf, replica: PathBuf },
    /// A differing replica file was overwritten from source.
    UpdatedFile { source: PathBuf, replica: PathBuf },
    /// A replica-only file was deleted.
    RemovedFile { replica: PathBuf },
    /// A replica-only directory was deleted with its contents.
    RemovedDirectory { replica: PathBuf },
    /// A replica entry of the wrong kind was deleted and replaced from source.
    Replaced { source: PathBuf, replica: PathBuf },
    /// The replica root did not exist and was created.
    ReplicaCreated { replica: PathBuf },
    /// A pass finished; the scheduler is pausing.
    Waiting { interval: Duration },
    /// The scheduler stopped on request.
    Stopped,
}

impl SyncEvent {
    /// Whether this event changed the replica tree.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Waiting { .. } | Self::Stopped)
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CopiedFile { source, replica } => {
                write!(f, "Copied file: {} to {}", source.display(), replica.display())
            }
            Self::CopiedDirectory { source, replica } => write!(
                f,
                "Copied directory: {} to {}",
                source.display(),
                replica.display()
            ),
            Self::UpdatedFile { source, replica } => {
                write!(f, "Updated file: {} to {}", source.display(), replica.display())
            }
            Self::RemovedFile { replica } => write!(f, "Removed file: {}", replica.display()),
            Self::RemovedDirectory { replica } => {
                write!(f, "Removed directory: {}", replica.display())
            }
            Self::Replaced { source, replica } => write!(
                f,
                "Replaced entry of different type: {} with {}",
                replica.display(),
                source.display()
            ),
            Self::ReplicaCreated { replica } => write!(
                f,
                "Replica path does not exist. Creating: {}",
                replica.display()
            ),
            Self::Waiting { interval } => write!(
                f,
                "Waiting for {} seconds before restarting...",
                interval.as_secs()
            ),
            Self::Stopped => write!(f, "Synchronization stopped by the user."),
        }
    }
}

/// Receiver of synchronization events and errors.
///
/// Constructed once at startup and shared with the scheduler and reconciler.
pub trait SyncObserver: Send + Sync {
    /// Called after every successful action and lifecycle change.
    fn on_event(&self, event: &SyncEvent);

    /// Called for every error, whether or not it ends the pass.
    fn on_error(&self, error: &SyncError);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SyncObserver for NullObserver {
    fn on_event(&self, _event: &SyncEvent) {}

    fn on_error(&self, _error: &SyncError) {}
}
