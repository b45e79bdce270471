use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a check from producing a verdict.
///
/// Threshold breaches and missing relay domains are not errors; they are
/// reported through [`crate::report::Severity`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Command {command:?} not found. Is it installed and are all paths correct? ({source})")]
    ExecutableNotFound {
        command: Vec<String>,
        source: io::Error,
    },

    #[error("Command {command:?} did not finish within {timeout_secs}s")]
    Timeout {
        command: Vec<String>,
        timeout_secs: u64,
    },

    #[error("Failed to collect output of {command:?}: {source}")]
    CommandIo {
        command: Vec<String>,
        source: io::Error,
    },

    #[error("Malformed response from `{query}`: {source}. Raw output: {body:?}")]
    MalformedResponse {
        query: String,
        body: String,
        source: serde_json::Error,
    },

    #[error("No cache snapshot at {}", .0.display())]
    CacheNotFound(PathBuf),

    #[error("Cache file {} could not be accessed: {source}", .path.display())]
    CacheIo { path: PathBuf, source: io::Error },

    #[error("Cache file {} is malformed: {source}", .path.display())]
    MalformedCache {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ProbeError {
    /// True for failures of the execution environment rather than of the data.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            ProbeError::ExecutableNotFound { .. }
                | ProbeError::Timeout { .. }
                | ProbeError::CommandIo { .. }
        )
    }

    /// True for cache problems that only cost accuracy, never the verdict.
    pub fn is_cache(&self) -> bool {
        matches!(
            self,
            ProbeError::CacheNotFound(_)
                | ProbeError::CacheIo { .. }
                | ProbeError::MalformedCache { .. }
        )
    }
}
