// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk: one bounded unit of copy work and its state machine.

use crate::id::ChunkId;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Status of a chunk over its lifetime.
///
/// Transitions are monotone apart from the retry edge:
/// Pending → Running → CompleteOk | CompleteWithWarnings | Failed | Skipped,
/// with Running → Pending allowed on a retryable failure (retry_count + 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// Waiting in the queue
    Pending,
    /// A copy job owns it
    Running,
    /// Copy engine reported clean success
    CompleteOk,
    /// Copy engine reported success with warnings (extras, mismatches)
    CompleteWithWarnings,
    /// Terminal failure (non-retryable or retries exhausted)
    Failed,
    /// Matched the resume set; never launched
    Skipped,
}

impl ChunkStatus {
    /// Terminal states: the chunk will not be dispatched again this run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChunkStatus::CompleteOk
                | ChunkStatus::CompleteWithWarnings
                | ChunkStatus::Failed
                | ChunkStatus::Skipped
        )
    }

    /// True for the two successful-completion states.
    pub fn is_complete(&self) -> bool {
        matches!(self, ChunkStatus::CompleteOk | ChunkStatus::CompleteWithWarnings)
    }
}

crate::simple_display! {
    ChunkStatus {
        Pending => "pending",
        Running => "running",
        CompleteOk => "complete",
        CompleteWithWarnings => "complete-with-warnings",
        Failed => "failed",
        Skipped => "skipped",
    }
}

/// Planner limits: a subtree is emitted as one chunk only when it fits both
/// the byte and file budgets, or the depth budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkLimits {
    pub max_bytes: u64,
    pub max_files: u64,
    pub max_depth: u32,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self { max_bytes: 10 * 1024 * 1024 * 1024, max_files: 100_000, max_depth: 3 }
    }
}

impl ChunkLimits {
    /// Whether a subtree of the given size fits within both budgets.
    pub fn fits(&self, bytes: u64, files: u64) -> bool {
        bytes <= self.max_bytes && files <= self.max_files
    }
}

/// A bounded unit of work: one directory subtree (or the loose files of one
/// directory) to be copied by a single copy-engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub estimated_bytes: u64,
    pub estimated_files: u64,
    /// Directory depth below the scan root at which this chunk was planned.
    pub depth: u32,
    /// False for loose-file chunks: copy only the files directly in `source`,
    /// not its subdirectories (those are covered by their own chunks).
    pub recursive: bool,
    pub status: ChunkStatus,
    pub retry_count: u32,
    /// Epoch ms before which the scheduler must not relaunch this chunk.
    pub retry_after_ms: Option<u64>,
    pub last_exit_code: Option<i32>,
    pub last_error: Option<String>,
}

impl Chunk {
    pub fn new(
        id: ChunkId,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        estimated_bytes: u64,
        estimated_files: u64,
        depth: u32,
        recursive: bool,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            destination: destination.into(),
            estimated_bytes,
            estimated_files,
            depth,
            recursive,
            status: ChunkStatus::Pending,
            retry_count: 0,
            retry_after_ms: None,
            last_exit_code: None,
            last_error: None,
        }
    }

    /// Whether the chunk may be launched now (its retry deadline has passed).
    pub fn ready_at(&self, now_ms: u64) -> bool {
        match self.retry_after_ms {
            Some(deadline) => now_ms >= deadline,
            None => true,
        }
    }

    /// Record a retryable failure.
    ///
    /// Bumps the count; while attempts remain under the policy, sets the
    /// backoff deadline and returns the chunk to Pending (true). Once the
    /// count reaches `max_retries` the failure is terminal (false) and the
    /// caller moves the chunk to Failed.
    pub fn register_failure(
        &mut self,
        policy: &RetryPolicy,
        now_ms: u64,
        error: impl Into<String>,
    ) -> bool {
        self.retry_count += 1;
        self.last_error = Some(error.into());
        if self.retry_count >= policy.max_retries {
            return false;
        }
        self.retry_after_ms = Some(now_ms + policy.backoff(self.retry_count).as_millis() as u64);
        self.status = ChunkStatus::Pending;
        true
    }
}

crate::builder! {
    pub struct ChunkBuilder => Chunk {
        into {
            source: PathBuf = "/src/data",
            destination: PathBuf = "/dst/data",
        }
        set {
            id: ChunkId = ChunkId(1),
            estimated_bytes: u64 = 1024,
            estimated_files: u64 = 10,
            depth: u32 = 0,
            recursive: bool = true,
            status: ChunkStatus = ChunkStatus::Pending,
            retry_count: u32 = 0,
        }
        option {
            retry_after_ms: u64,
            last_exit_code: i32,
            last_error: String,
        }
    }
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
