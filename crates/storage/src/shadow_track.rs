// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process tracking of created volume snapshots.
//!
//! Every successfully created shadow id is appended here so a run that
//! crashes mid-profile leaves a trail; the next run's bootstrap sweeps the
//! listed ids and removes any the provider still reports. Any process of
//! this tool may touch the file, so access is serialized through an
//! advisory file lock with a bounded acquire wait.

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from the shadow tracking file.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out acquiring shadow-track lock at {0}")]
    LockTimeout(PathBuf),
}

/// Tracking file of shadow ids, one per line.
pub struct ShadowTracker {
    path: PathBuf,
    lock_timeout: Duration,
}

impl ShadowTracker {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join("shadow-ids"), lock_timeout: Self::DEFAULT_LOCK_TIMEOUT }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the advisory lock, polling until the timeout.
    fn lock(&self) -> Result<fs::File, TrackerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new().create(true).truncate(false).write(true).open(&lock_path)?;

        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(file),
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(_) => return Err(TrackerError::LockTimeout(lock_path)),
            }
        }
    }

    /// Append a shadow id (no-op if already present).
    pub fn record(&self, shadow_id: &str) -> Result<(), TrackerError> {
        let guard = self.lock()?;
        let ids = self.read_ids()?;
        if !ids.iter().any(|id| id == shadow_id) {
            let mut file =
                OpenOptions::new().create(true).append(true).open(&self.path)?;
            writeln!(file, "{}", shadow_id)?;
        }
        let _ = fs2::FileExt::unlock(&guard);
        Ok(())
    }

    /// Drop a shadow id from the file.
    pub fn forget(&self, shadow_id: &str) -> Result<(), TrackerError> {
        let guard = self.lock()?;
        let remaining: Vec<String> =
            self.read_ids()?.into_iter().filter(|id| id != shadow_id).collect();
        self.write_ids(&remaining)?;
        let _ = fs2::FileExt::unlock(&guard);
        Ok(())
    }

    /// All tracked shadow ids.
    pub fn list(&self) -> Result<Vec<String>, TrackerError> {
        let guard = self.lock()?;
        let ids = self.read_ids()?;
        let _ = fs2::FileExt::unlock(&guard);
        Ok(ids)
    }

    /// Remove every tracked id.
    pub fn clear(&self) -> Result<(), TrackerError> {
        let guard = self.lock()?;
        self.write_ids(&[])?;
        let _ = fs2::FileExt::unlock(&guard);
        Ok(())
    }

    fn read_ids(&self) -> Result<Vec<String>, TrackerError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_ids(&self, ids: &[String]) -> Result<(), TrackerError> {
        let tmp = self.path.with_extension("tmp");
        let mut body = ids.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "shadow_track_tests.rs"]
mod tests;
