// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copy-engine exit classification and job statistics.

use crate::chunk::ChunkStatus;
use serde::{Deserialize, Serialize};

/// Severity class of a copy-engine exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitClass {
    Success,
    Warning,
    Error,
    Fatal,
}

impl ExitClass {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExitClass::Error | ExitClass::Fatal)
    }
}

crate::simple_display! {
    ExitClass {
        Success => "success",
        Warning => "warning",
        Error => "error",
        Fatal => "fatal",
    }
}

/// Totals parsed from a finished job's log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub files_copied: u64,
    pub bytes_copied: u64,
}

/// Classified result of one finished copy job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOutcome {
    pub class: ExitClass,
    pub should_retry: bool,
    pub exit_code: i32,
    pub message: String,
    pub stats: JobStats,
}

impl CopyOutcome {
    /// The chunk status this outcome maps to when it is terminal.
    pub fn chunk_status(&self) -> ChunkStatus {
        match self.class {
            ExitClass::Success => ChunkStatus::CompleteOk,
            ExitClass::Warning => ChunkStatus::CompleteWithWarnings,
            ExitClass::Error | ExitClass::Fatal => ChunkStatus::Failed,
        }
    }
}

/// Best-effort progress reading from a running job's log tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSample {
    pub bytes_copied: u64,
    pub bytes_per_sec: u64,
    pub sampled_at_ms: u64,
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
