//! File-based locking to prevent concurrent prune runs.
//!
//! Two passes racing on the same rule set could each delete rules the other
//! already decided about; the second one is refused instead.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::PortsweepError;

/// Holds an exclusive advisory lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    _file: File,
}

impl LockGuard {
    /// Take the lock at `path` without blocking.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }

        // create+read+write without truncate: no race between create and lock
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .context("Failed to set lock file permissions")?;

        file.try_lock_exclusive()
            .map_err(|_| PortsweepError::Lock(path.display().to_string()))?;

        Ok(Self { _file: file })
    }
}
