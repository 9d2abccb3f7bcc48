//! File-backed registry of posting keys already shown to the user.
//!
//! The on-disk format is a JSON document `{ "seenKeys": [...], "lastUpdated":
//! ISO }`, oldest key first, capped at [`MAX_SEEN_JOBS`] entries. Commits are
//! atomic (write-then-rename) but assume a single writer; concurrent writers
//! would race read-modify-write and lose keys, which is acceptable for a
//! single-instance deployment.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Registry capacity. Oldest keys are evicted first once exceeded.
pub const MAX_SEEN_JOBS: usize = 1000;

const SEEN_JOBS_FILE: &str = "seen_jobs.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeenJobsFile {
    #[serde(default)]
    seen_keys: Vec<String>,
    last_updated: String,
}

pub struct SeenJobsStore {
    path: PathBuf,
    capacity: usize,
}

impl SeenJobsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SEEN_JOBS_FILE),
            capacity: MAX_SEEN_JOBS,
        }
    }

    #[cfg(test)]
    pub fn with_capacity(data_dir: &Path, capacity: usize) -> Self {
        Self {
            path: data_dir.join(SEEN_JOBS_FILE),
            capacity,
        }
    }

    /// Loads every seen key, oldest first. Any I/O or parse failure is
    /// logged and degrades to an empty registry — dedup state is best-effort.
    pub fn load_all(&self) -> Vec<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                error!("failed to read seen-jobs file: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<SeenJobsFile>(&raw) {
            Ok(file) => file.seen_keys,
            Err(e) => {
                error!("seen-jobs file is corrupt, starting fresh: {e}");
                Vec::new()
            }
        }
    }

    /// Appends the given keys (skipping any already present), evicts the
    /// oldest entries beyond capacity, and atomically rewrites the file.
    pub fn commit(&self, new_keys: &[String]) -> Result<()> {
        let mut keys = self.load_all();
        let mut present: std::collections::HashSet<String> = keys.iter().cloned().collect();

        for key in new_keys {
            if present.insert(key.clone()) {
                keys.push(key.clone());
            }
        }

        if keys.len() > self.capacity {
            let excess = keys.len() - self.capacity;
            keys.drain(..excess);
        }

        self.write(keys)
    }

    /// Resets the registry to empty.
    pub fn clear(&self) -> Result<()> {
        self.write(Vec::new())?;
        info!("seen-jobs registry cleared");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.load_all().len()
    }

    fn write(&self, seen_keys: Vec<String>) -> Result<()> {
        let file = SeenJobsFile {
            seen_keys,
            last_updated: Utc::now().to_rfc3339(),
        };

        let dir = self
            .path
            .parent()
            .context("seen-jobs path has no parent directory")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;

        let body = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
