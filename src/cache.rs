use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::SenderStat;
use crate::error::ProbeError;

/// Accurate per-sender total taken from the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub sender: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Written(usize),
    /// Nothing qualified, the previous snapshot was left alone.
    Skipped,
}

/// Snapshot of the last computed accurate counts, stored as a JSON array.
///
/// The summary endpoint undercounts messages with several recipients, so
/// senders with more than one message are re-counted through the detail
/// endpoint and the result is kept here for later runs.
#[derive(Debug, Clone)]
pub struct ResultCache {
    path: PathBuf,
}

impl ResultCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<CacheEntry>, ProbeError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProbeError::CacheNotFound(self.path.clone()))
            }
            Err(source) => {
                return Err(ProbeError::CacheIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ProbeError::MalformedCache {
            path: self.path.clone(),
            source,
        })
    }

    /// The snapshot if one is usable, otherwise `None`.
    pub fn load_snapshot(&self) -> Option<Vec<CacheEntry>> {
        match self.load() {
            Ok(entries) if entries.is_empty() => {
                debug!(action = "load", component = "result_cache", path = ?self.path, "Cache snapshot is empty");
                None
            }
            Ok(entries) => {
                info!(action = "load", component = "result_cache", path = ?self.path, entry_count = entries.len(), "Loaded cache snapshot");
                Some(entries)
            }
            Err(ProbeError::CacheNotFound(_)) => {
                debug!(action = "load", component = "result_cache", path = ?self.path, "No cache snapshot");
                None
            }
            Err(e) => {
                warn!(action = "load", component = "result_cache", error = %e, "Ignoring unusable cache snapshot");
                None
            }
        }
    }

    /// Re-counts every sender with more than one message and replaces the
    /// snapshot with the result. An empty result leaves the file untouched.
    pub fn refresh<F>(
        &self,
        stats: &[SenderStat],
        mut detail_count: F,
    ) -> Result<RefreshOutcome, ProbeError>
    where
        F: FnMut(&str) -> Result<u64, ProbeError>,
    {
        let start_time = Instant::now();
        info!(action = "start", component = "cache_refresh", "Refreshing sender count cache");

        let mut snapshot = Vec::new();
        for stat in stats.iter().filter(|stat| stat.count > 1) {
            let count = detail_count(&stat.sender)?;
            snapshot.push(CacheEntry {
                sender: stat.sender.clone(),
                count,
            });
        }

        if snapshot.is_empty() {
            info!(action = "skip", component = "cache_refresh", "No sender qualified, keeping previous snapshot");
            return Ok(RefreshOutcome::Skipped);
        }

        self.write(&snapshot)?;
        info!(
            action = "complete",
            component = "cache_refresh",
            entry_count = snapshot.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Cache snapshot written"
        );
        Ok(RefreshOutcome::Written(snapshot.len()))
    }

    fn write(&self, entries: &[CacheEntry]) -> Result<(), ProbeError> {
        let io_error = |source| ProbeError::CacheIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content =
            serde_json::to_string_pretty(entries).map_err(|source| ProbeError::MalformedCache {
                path: self.path.clone(),
                source,
            })?;

        // Write beside the target and rename so readers never see a partial file.
        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(io_error)?;
        fs::rename(&temp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            io_error(source)
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("cache"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
