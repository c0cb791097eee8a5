// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run phase and per-profile results.

use serde::{Deserialize, Serialize};

/// Phase of the replication run.
///
/// A run always ends in Complete or Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    /// Profiling and planning the current profile's source tree.
    Preparing,
    /// The worker pool is draining chunks.
    Replicating,
    Complete,
    Stopped,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Complete | RunPhase::Stopped)
    }
}

crate::simple_display! {
    RunPhase {
        Idle => "idle",
        Preparing => "preparing",
        Replicating => "replicating",
        Complete => "complete",
        Stopped => "stopped",
    }
}

/// Aggregate outcome of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Success,
    Warning,
}

crate::simple_display! {
    ProfileStatus {
        Success => "success",
        Warning => "warning",
    }
}

/// Result emitted when a profile finishes draining (or is skipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub profile: String,
    pub status: ProfileStatus,
    pub chunks_complete: u64,
    pub chunks_failed: u64,
    pub chunks_skipped: u64,
    pub bytes_complete: u64,
    pub elapsed_ms: u64,
    /// One entry per failed chunk: "chunk <id>: <source>".
    pub errors: Vec<String>,
}

impl ProfileResult {
    /// Status is Warning whenever any chunk failed or an error was recorded.
    pub fn status_for(chunks_failed: u64, errors: &[String]) -> ProfileStatus {
        if chunks_failed > 0 || !errors.is_empty() {
            ProfileStatus::Warning
        } else {
            ProfileStatus::Success
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
