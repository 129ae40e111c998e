//! Error types for synchronization.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing or running a synchronization pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source directory is missing at startup.
    #[error("Source path does not exist: {path}")]
    SourceMissing { path: PathBuf },

    /// Source or replica root exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The log file could not be created or opened.
    #[error("Unable to create log file at {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking task running a pass panicked or was cancelled.
    #[error("Synchronization task failed: {message}")]
    Task { message: String },
}

impl SyncError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error belongs to startup configuration rather than a pass.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::SourceMissing { .. }
                | Self::NotADirectory { .. }
                | Self::InvalidConfig { .. }
                | Self::LogFile { .. }
        )
    }

    /// Whether the failing path vanished.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
