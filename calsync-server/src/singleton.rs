//! One calsync-server per user.
//!
//! The lock file also records the port the holder listens on, so a second
//! start can point at the running server.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Holds the lock until dropped
pub struct LockGuard {
    _file: File,
}

fn default_lock_path() -> Result<PathBuf> {
    let base = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine a runtime directory for the server lock")?;

    Ok(base.join("calsync").join("server.lock"))
}

/// Lock the per-user server slot for a server on `port`.
pub fn acquire_lock(port: u16) -> Result<LockGuard> {
    acquire_lock_at(&default_lock_path()?, port)
}

fn acquire_lock_at(path: &Path, port: u16) -> Result<LockGuard> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    // Not truncated before locking: the holder's port must stay readable
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        let mut holder = String::new();
        let _ = file.read_to_string(&mut holder);
        let running = match holder.trim().parse::<u16>() {
            Ok(port) => format!("calsync-server is already running on http://127.0.0.1:{port}"),
            Err(_) => "calsync-server is already running".to_string(),
        };
        anyhow::bail!("{running}\nIf it is not, remove {}", path.display());
    }

    file.set_len(0)?;
    write!(file, "{port}")?;
    file.flush()?;

    Ok(LockGuard { _file: file })
}
