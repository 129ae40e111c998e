//! Synchronization configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// How two common files are tested for equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CompareMode {
    /// Size and modification time must match. No content is read.
    #[default]
    #[strum(to_string = "shallow")]
    Shallow,
    /// Like `Shallow`, but equal-size files with differing modification
    /// times are compared byte by byte.
    #[strum(to_string = "deep")]
    Deep,
}

/// What a pass does when a single entry action fails.
///
/// Entries that vanish between listing and action are always skipped,
/// whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ErrorPolicy {
    /// Abort the whole pass and stop the scheduler.
    #[default]
    #[strum(to_string = "abort-pass")]
    AbortPass,
    /// Log the failure and continue with sibling entries.
    #[strum(to_string = "skip-entry")]
    SkipEntry,
}

/// Configuration for a synchronization job.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SyncConfig {
    /// Authoritative source directory.
    pub source: PathBuf,

    /// Replica directory kept in sync with source.
    pub replica: PathBuf,

    /// Pause between passes.
    #[builder(default = "Duration::from_secs(60)")]
    #[serde(default = "default_interval")]
    pub interval: Duration,

    /// Equality test for common files.
    #[builder(default)]
    #[serde(default)]
    pub compare_mode: CompareMode,

    /// Failure handling for individual entry actions.
    #[builder(default)]
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Glob patterns matched against entry names; matches are ignored on
    /// both sides.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

impl SyncConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let source = match self.source {
            Some(ref source) if !source.as_os_str().is_empty() => source,
            Some(_) => return Err("Source path cannot be empty".to_string()),
            None => return Err("Source path is required".to_string()),
        };
        let replica = match self.replica {
            Some(ref replica) if !replica.as_os_str().is_empty() => replica,
            Some(_) => return Err("Replica path cannot be empty".to_string()),
            None => return Err("Replica path is required".to_string()),
        };
        if source == replica {
            return Err("Source and replica must be different paths".to_string());
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Create a new sync config builder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Create a config with default options for a directory pair.
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval,
            compare_mode: CompareMode::default(),
            error_policy: ErrorPolicy::default(),
            ignore_patterns: Vec::new(),
        }
    }
}
