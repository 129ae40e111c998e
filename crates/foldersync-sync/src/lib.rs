//! Reconciliation and scheduling for foldersync.
//!
//! - [`Reconciler`] compares a directory pair one level at a time and applies
//!   copy, update, remove and replace actions, recursing into common
//!   subdirectories.
//! - [`Scheduler`] validates the source, creates the replica, and re-runs a
//!   full pass every interval until cancelled or a pass fails.
//! - [`TracingObserver`] forwards every action and error to `tracing`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use foldersync_sync::{Scheduler, SyncConfig, TracingObserver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), foldersync_sync::SyncError> {
//! let config = SyncConfig::new("/data/source", "/data/replica", Duration::from_secs(30));
//! let mut scheduler = Scheduler::start(config, Arc::new(TracingObserver::new()))?;
//!
//! let shutdown = CancellationToken::new();
//! let passes = scheduler.run(shutdown).await?;
//! println!("stopped after {passes} passes");
//! # Ok(())
//! # }
//! ```

mod observer;
mod reconcile;
mod report;
mod scheduler;

pub use observer::TracingObserver;
pub use reconcile::Reconciler;
pub use report::PassReport;
pub use scheduler::{Scheduler, SchedulerState};

// Re-export core types for convenience
pub use foldersync_core::{
    CompareMode, ErrorPolicy, SyncConfig, SyncConfigBuilder, SyncError, SyncEvent, SyncObserver,
};
