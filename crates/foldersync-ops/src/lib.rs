//! Filesystem primitives for foldersync.
//!
//! Blocking copy and removal operations used by the reconciler. Copies carry
//! over permissions and access/modification times so that a copied file
//! compares equal to its source on the next pass. Every error carries the
//! path it happened at.

mod copy;
mod remove;

pub use copy::{CopyStats, copy_file, copy_tree};
pub use remove::{remove_entry, remove_file, remove_tree, replace_entry};
