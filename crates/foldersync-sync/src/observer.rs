//! Observer that forwards events to `tracing`.

use foldersync_core::{SyncError, SyncEvent, SyncObserver};
use tracing::Level;

/// Emits one line per event and one ERROR line per error.
///
/// Actions and lifecycle changes go to INFO; the wait between passes goes
/// to DEBUG so it stays out of the log at the default level. Where the lines
/// end up is decided by the subscriber the binary installs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    /// Create a new tracing observer.
    pub fn new() -> Self {
        Self
    }
}

/// Level an event is logged at.
fn event_level(event: &SyncEvent) -> Level {
    match event {
        SyncEvent::Waiting { .. } => Level::DEBUG,
        _ => Level::INFO,
    }
}

impl SyncObserver for TracingObserver {
    fn on_event(&self, event: &SyncEvent) {
        if event_level(event) == Level::DEBUG {
            tracing::debug!("{event}");
        } else {
            tracing::info!("{event}");
        }
    }

    fn on_error(&self, error: &SyncError) {
        tracing::error!("{error}");
    }
}
