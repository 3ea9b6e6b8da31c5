//! JSON file holding the local provider's events.
//!
//! Every request opens the file under an exclusive lock, works on an
//! in-memory copy and writes it back before the lock is released, so
//! concurrent provider processes never interleave.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calsync_core::remote::{MemorySnapshot, MemoryStore};
use fs2::FileExt;
use tracing::debug;

pub struct LocalStore {
    path: PathBuf,
    _lock: File,
    pub events: MemoryStore,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open {}", lock_path.display()))?;
        lock.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;

        let snapshot = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<MemorySnapshot>(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            MemorySnapshot::default()
        };
        debug!(path = %path.display(), records = snapshot.records.len(), "store opened");

        Ok(LocalStore {
            path: path.to_path_buf(),
            _lock: lock,
            events: MemoryStore::from_snapshot(snapshot),
        })
    }

    /// Write the current contents back, replacing the file atomically.
    pub async fn save(&self) -> Result<()> {
        let snapshot = self.events.snapshot().await;
        let content = serde_json::to_string_pretty(&snapshot)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
