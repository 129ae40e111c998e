//! Equality test for files present on both sides.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use foldersync_core::CompareMode;
use tracing::debug;

const CHUNK_SIZE: usize = 64 * 1024;

/// Decide whether two files are the same.
///
/// Both files must be regular files of equal size. With
/// [`CompareMode::Shallow`] their modification times must also match; with
/// [`CompareMode::Deep`] a modification time mismatch falls back to a byte
/// comparison. Any error reading metadata or content counts as different.
pub fn files_equal(source: &Path, replica: &Path, mode: CompareMode) -> bool {
    let (src_meta, rep_meta) = match (fs::metadata(source), fs::metadata(replica)) {
        (Ok(s), Ok(r)) => (s, r),
        _ => return false,
    };

    if !src_meta.is_file() || !rep_meta.is_file() {
        return false;
    }

    if src_meta.len() != rep_meta.len() {
        debug!(
            "Size differs: {} (src={}, dst={})",
            source.display(),
            src_meta.len(),
            rep_meta.len()
        );
        return false;
    }

    match (src_meta.modified(), rep_meta.modified()) {
        (Ok(s), Ok(r)) if s == r => return true,
        _ => {}
    }

    match mode {
        CompareMode::Shallow => {
            debug!("Modification time differs: {}", source.display());
            false
        }
        CompareMode::Deep => contents_equal(source, replica).unwrap_or(false),
    }
}

/// Compare two files chunk by chunk.
fn contents_equal(a: &Path, b: &Path) -> io::Result<bool> {
    let mut a = BufReader::with_capacity(CHUNK_SIZE, File::open(a)?);
    let mut b = BufReader::with_capacity(CHUNK_SIZE, File::open(b)?);

    loop {
        let buf_a = a.fill_buf()?;
        let buf_b = b.fill_buf()?;

        if buf_a.is_empty() || buf_b.is_empty() {
            return Ok(buf_a.is_empty() && buf_b.is_empty());
        }

        let n = buf_a.len().min(buf_b.len());
        if buf_a[..n] != buf_b[..n] {
            return Ok(false);
        }

        a.consume(n);
        b.consume(n);
    }
}
