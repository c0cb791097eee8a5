// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication profile: one (source, destination, options) pairing.

use crate::chunk::ChunkLimits;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the planner partitions a profile's source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Subtree-size analysis: emit the largest subtrees that fit the limits.
    #[default]
    Smart,
    /// Fixed-depth enumeration: one chunk per directory at exactly max_depth.
    Flat,
}

crate::simple_display! {
    ScanMode {
        Smart => "smart",
        Flat => "flat",
    }
}

/// Per-profile reinterpretation of the engine's "destination has
/// extras/mismatches" exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchSeverity {
    Success,
    Warning,
    Error,
}

crate::simple_display! {
    MismatchSeverity {
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

/// Options forwarded to the copy engine for every job of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyOptions {
    /// Extra engine switches appended verbatim (adapter-validated).
    pub switches: Vec<String>,
    pub exclude_files: Vec<String>,
    pub exclude_dirs: Vec<String>,
    /// In-job retry count (the engine's own retry, below the scheduler's).
    pub retry_count: u32,
    pub retry_wait_secs: u32,
    pub mismatch_severity: Option<MismatchSeverity>,
    pub threads_per_job: u32,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            switches: Vec::new(),
            exclude_files: Vec::new(),
            exclude_dirs: Vec::new(),
            retry_count: 2,
            retry_wait_secs: 5,
            mismatch_severity: None,
            threads_per_job: 8,
        }
    }
}

/// A replication profile, executed end-to-end before the next begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable unique name (checkpoint and health records refer to it).
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(default)]
    pub scan_mode: ScanMode,
    #[serde(default)]
    pub limits: ChunkLimits,
    #[serde(default)]
    pub use_snapshot: bool,
    #[serde(default)]
    pub copy: CopyOptions,
    /// Opaque schedule descriptor for external schedulers; the core ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
            scan_mode: ScanMode::default(),
            limits: ChunkLimits::default(),
            use_snapshot: false,
            copy: CopyOptions::default(),
            schedule: None,
        }
    }
}

crate::builder! {
    pub struct ProfileBuilder => Profile {
        into {
            name: String = "test-profile",
            source: PathBuf = "/src",
            destination: PathBuf = "/dst",
        }
        set {
            scan_mode: ScanMode = ScanMode::Smart,
            limits: ChunkLimits = ChunkLimits::default(),
            use_snapshot: bool = false,
            copy: CopyOptions = CopyOptions::default(),
        }
        option {
            schedule: String,
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
