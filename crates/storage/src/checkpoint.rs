// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint persistence for crash-safe resume.
//!
//! The checkpoint records which chunk source paths have completed so a
//! restarted run can skip them. Writes are atomic: serialize to
//! `checkpoint.tmp`, move the existing file to `checkpoint.bak`, rename the
//! tmp over `checkpoint`, then drop the `.bak`. The file is never truncated
//! in place, so a crash at any point leaves a parseable prefix of progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current checkpoint schema version.
pub const CHECKPOINT_SCHEMA_VERSION: &str = "1.0";

/// Errors that can occur in checkpoint operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent record of successful progress within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub schema_version: String,
    pub session_id: String,
    pub saved_at: DateTime<Utc>,
    pub profile_index: usize,
    pub current_profile_name: String,
    /// Source paths of chunks the engine reported a non-failing exit for.
    pub completed_source_paths: Vec<String>,
    pub completed_count: u64,
    pub failed_count: u64,
    pub bytes_complete: u64,
    pub start_time: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION.to_string(),
            session_id: session_id.into(),
            saved_at: now,
            profile_index: 0,
            current_profile_name: String::new(),
            completed_source_paths: Vec::new(),
            completed_count: 0,
            failed_count: 0,
            bytes_complete: 0,
            start_time: now,
        }
    }
}

/// Case-insensitive set of completed source paths for O(1) skip decisions.
#[derive(Debug, Clone, Default)]
pub struct ResumeSet {
    paths: HashSet<String>,
}

impl ResumeSet {
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Self {
        let paths =
            checkpoint.completed_source_paths.iter().map(|p| p.to_lowercase()).collect();
        Self { paths }
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.paths.contains(&source.display().to_string().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Atomic file store for the checkpoint.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store under `dir/checkpoint` (the directory is created on save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join("checkpoint") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn bak_path(&self) -> PathBuf {
        self.path.with_extension("bak")
    }

    /// Write the checkpoint with atomic-replace semantics.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, serde_json::to_vec_pretty(checkpoint)?)?;

        let bak = self.bak_path();
        if self.path.exists() {
            fs::rename(&self.path, &bak)?;
        }
        fs::rename(&tmp, &self.path)?;
        if bak.exists() {
            let _ = fs::remove_file(&bak);
        }
        Ok(())
    }

    /// Load the checkpoint, or None when absent, unreadable, or from a
    /// different schema version (warn and start fresh).
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let checkpoint: Checkpoint = match serde_json::from_str(&raw) {
            Ok(cp) => cp,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable checkpoint, starting fresh");
                return Ok(None);
            }
        };
        if checkpoint.schema_version != CHECKPOINT_SCHEMA_VERSION {
            tracing::warn!(
                found = %checkpoint.schema_version,
                expected = CHECKPOINT_SCHEMA_VERSION,
                "checkpoint schema mismatch, starting fresh"
            );
            return Ok(None);
        }
        Ok(Some(checkpoint))
    }

    /// Delete the checkpoint and its working files. Missing files are fine.
    pub fn remove(&self) -> Result<(), CheckpointError> {
        for path in [&self.path, &self.tmp_path(), &self.bak_path()] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
