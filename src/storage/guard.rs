//! Write-access guard
//!
//! Mutating operations must not race an external process that has the ledger
//! open (a sync agent, another machine's editor). Such a process advertises
//! itself through a sentinel lock file beside the data file. The guard reports
//! a human-readable blocking reason while a fresh foreign lock exists; stale
//! locks (older than the TTL) and locks held by this process do not block.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TallyError, TallyResult};

/// A lock older than this is considered abandoned and ignored
const LOCK_TTL_SECS: u64 = 120;

/// Contents of the sentinel lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// PID of the process holding the ledger open
    pub pid: u32,

    /// Short description of the holder (e.g., "sync-agent")
    #[serde(default)]
    pub holder: String,

    /// When the lock was taken (UTC)
    pub acquired_at: DateTime<Utc>,
}

/// Checks whether writes to the ledger are currently allowed
#[derive(Debug, Clone)]
pub struct WriteGuard {
    lock_path: PathBuf,
}

impl WriteGuard {
    /// Create a guard watching the given lock file
    pub fn new(lock_path: PathBuf) -> Self {
        Self { lock_path }
    }

    /// Return a human-readable blocking reason if an external process
    /// currently holds the ledger open, else `None`
    ///
    /// Freshness is judged by the lock file's mtime so that an unparseable
    /// lock still blocks while fresh and expires like any other.
    pub fn check(&self) -> TallyResult<Option<String>> {
        let metadata = match std::fs::metadata(&self.lock_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TallyError::Io(format!(
                    "Failed to inspect lock file: {}",
                    e
                )))
            }
        };

        let modified = metadata
            .modified()
            .map_err(|e| TallyError::Io(format!("Failed to read lock file mtime: {}", e)))?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age.as_secs() > LOCK_TTL_SECS {
            // Abandoned lock
            return Ok(None);
        }

        match self.read_info() {
            Some(info) if info.pid == std::process::id() => Ok(None),
            Some(info) => {
                let holder = if info.holder.is_empty() {
                    "another process".to_string()
                } else {
                    info.holder.clone()
                };
                Ok(Some(format!(
                    "ledger is held open by {} (pid {}) since {}",
                    holder,
                    info.pid,
                    info.acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )))
            }
            None => Ok(Some(
                "ledger is held open by another process (unreadable lock file)".to_string(),
            )),
        }
    }

    /// Write a lock file marking the ledger as held by this process
    pub fn hold(&self, holder: impl Into<String>) -> TallyResult<()> {
        let info = LockInfo {
            pid: std::process::id(),
            holder: holder.into(),
            acquired_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&info)?;
        std::fs::write(&self.lock_path, contents)
            .map_err(|e| TallyError::Io(format!("Failed to write lock file: {}", e)))?;
        Ok(())
    }

    /// Remove the lock file if present
    pub fn release(&self) -> TallyResult<()> {
        match std::fs::remove_file(&self.lock_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TallyError::Io(format!("Failed to remove lock file: {}", e))),
        }
    }

    fn read_info(&self) -> Option<LockInfo> {
        let contents = std::fs::read_to_string(&self.lock_path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}
