// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic health probe file.
//!
//! External monitors read this file to tell a live run from a hung one.
//! Writes are throttled to one per interval; terminal phase transitions
//! force a write; the file is removed when a run completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use vmir_core::RunPhase;

/// Snapshot of run liveness for external monitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub updated_at: DateTime<Utc>,
    pub phase: RunPhase,
    pub completed_count: u64,
    pub total_chunks: u64,
    pub current_profile: Option<String>,
}

/// Throttled writer for the health probe file.
pub struct HealthWriter {
    path: PathBuf,
    interval_ms: u64,
    last_write_ms: AtomicU64,
}

impl HealthWriter {
    pub const DEFAULT_INTERVAL_MS: u64 = 30_000;

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_interval(dir, Self::DEFAULT_INTERVAL_MS)
    }

    pub fn with_interval(dir: impl Into<PathBuf>, interval_ms: u64) -> Self {
        Self { path: dir.into().join("health.json"), interval_ms, last_write_ms: AtomicU64::new(0) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write if at least one interval has passed since the last write.
    /// Returns whether a write happened.
    pub fn write_throttled(
        &self,
        record: &HealthRecord,
        now_ms: u64,
    ) -> Result<bool, std::io::Error> {
        let last = self.last_write_ms.load(Ordering::Acquire);
        if last != 0 && now_ms.saturating_sub(last) < self.interval_ms {
            return Ok(false);
        }
        self.write_forced(record, now_ms)?;
        Ok(true)
    }

    /// Unconditional write (terminal phase transitions).
    pub fn write_forced(&self, record: &HealthRecord, now_ms: u64) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(record).unwrap_or_default())?;
        fs::rename(&tmp, &self.path)?;
        self.last_write_ms.store(now_ms, Ordering::Release);
        Ok(())
    }

    /// Remove the probe file (run complete). Missing file is fine.
    pub fn remove(&self) -> Result<(), std::io::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
