// ABOUTME: Advisory deploy lock preventing concurrent deployments to one installation.
// ABOUTME: Uses atomic file creation with lock info stored as JSON in a state directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Errors from acquiring or releasing a deploy lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("deployment already in progress: lock held by {holder} (pid {pid}) since {started_at}")]
    Held {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("deploy lock error: {0}")]
    Io(String),
}

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Installation being deployed to.
    pub installation: PathBuf,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(installation: &Path) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            installation: installation.to_path_buf(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file for an installation root.
    pub fn lock_path(dir: &Path, installation: &Path) -> PathBuf {
        let key: String = installation
            .to_string_lossy()
            .trim_matches('/')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        let key = if key.is_empty() { "root".to_string() } else { key };
        dir.join(format!("{}.lock", key))
    }
}

/// A held deploy lock. Released explicitly, or on drop as a fallback.
#[derive(Debug)]
pub struct DeployLock {
    path: PathBuf,
    released: bool,
}

impl DeployLock {
    /// Acquire the deploy lock for an installation.
    ///
    /// Uses `create_new` for atomic acquisition (no TOCTOU race). Returns
    /// `LockError::Held` if another live deployment holds it. Stale (>1 hour)
    /// and unreadable locks are broken with a warning; `force` breaks any lock.
    pub fn acquire(dir: &Path, installation: &Path, force: bool) -> Result<Self, LockError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            LockError::Io(format!(
                "failed to create state directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = LockInfo::lock_path(dir, installation);
        let info = LockInfo::new(installation);
        let json = serde_json::to_string(&info)
            .map_err(|e| LockError::Io(format!("failed to serialize lock: {}", e)))?;

        if Self::try_create(&path, &json)? {
            return Ok(Self {
                path,
                released: false,
            });
        }

        // Lock acquisition failed - check if existing lock should be broken
        if !Self::should_break(&path, force)? {
            return match Self::read_info(&path) {
                Some(existing) => Err(LockError::Held {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                }),
                None => Err(LockError::Io(
                    "lock held by another process".to_string(),
                )),
            };
        }

        tracing::debug!("Removing stale/forced lock at {}", path.display());
        let _ = std::fs::remove_file(&path);

        if !Self::try_create(&path, &json)? {
            return Err(LockError::Io(
                "lock acquired by another process during break".to_string(),
            ));
        }

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        std::fs::remove_file(&self.path).map_err(|e| {
            LockError::Io(format!(
                "failed to remove lock {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Returns false if the file already exists.
    fn try_create(path: &Path, json: &str) -> Result<bool, LockError> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())
                    .map_err(|e| LockError::Io(format!("failed to write lock: {}", e)))?;
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(LockError::Io(format!("failed to acquire lock: {}", e))),
        }
    }

    fn read_info(path: &Path) -> Option<LockInfo> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Check if an existing lock should be broken (stale, forced, or corrupted).
    fn should_break(path: &Path, force: bool) -> Result<bool, LockError> {
        let Some(existing) = Self::read_info(path) else {
            tracing::warn!("Lock info unreadable, breaking lock");
            return Ok(true);
        };

        if force {
            tracing::warn!(
                "Breaking lock held by {} (pid {}) since {}",
                existing.holder,
                existing.pid,
                existing.started_at
            );
            Ok(true)
        } else if existing.is_stale() {
            tracing::warn!(
                "Auto-breaking stale lock held by {} (pid {}) since {}",
                existing.holder,
                existing.pid,
                existing.started_at
            );
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
