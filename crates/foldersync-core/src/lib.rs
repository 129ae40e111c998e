//! Core types and traits for foldersync.
//!
//! This crate provides the data structures shared by the comparator, the
//! filesystem primitives and the reconciler: entry classifications, sync
//! events and the observer they are reported to, configuration, and errors.

mod classification;
mod config;
mod error;
mod event;

pub use classification::{Classification, Entry, EntryKind};
pub use config::{CompareMode, ErrorPolicy, SyncConfig, SyncConfigBuilder};
pub use error::SyncError;
pub use event::{NullObserver, SyncEvent, SyncObserver};
