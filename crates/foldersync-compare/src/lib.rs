//! Directory comparison for foldersync.
//!
//! [`TreeComparator`] classifies the direct children of a source/replica
//! directory pair. It never recurses and never writes; the reconciler drives
//! recursion by comparing each common subdirectory pair in turn.
//!
//! ```rust,no_run
//! use foldersync_compare::TreeComparator;
//!
//! let comparator = TreeComparator::new();
//! let classification = comparator.compare("/data/source".as_ref(), "/data/replica".as_ref()).unwrap();
//!
//! for entry in &classification.source_only {
//!     println!("missing from replica: {:?}", entry.name);
//! }
//! ```

mod comparator;
mod equality;

pub use comparator::TreeComparator;
pub use equality::files_equal;

// Re-export core types for convenience
pub use foldersync_core::{Classification, CompareMode, Entry, EntryKind, SyncError};
