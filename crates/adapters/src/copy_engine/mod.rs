// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copy-engine adapter: one external copy process per chunk.
//!
//! The engine is a black box behind this trait; command construction, flag
//! dialect and log format never leak past the adapter. The scheduler only
//! sees [`JobRequest`] in and [`CopyOutcome`] out.

mod exit_codes;
mod log_parse;
mod shell;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use exit_codes::{classify_exit, ExitClassification};
pub use shell::ShellCopyEngine;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use vmir_core::{Chunk, CopyOptions, CopyOutcome, JobId, ProgressSample};

/// Errors from the copy-engine adapter.
#[derive(Debug, Error)]
pub enum CopyEngineError {
    #[error("copy engine not invocable: {0}")]
    NotInvocable(String),
    #[error("failed to start copy job: {0}")]
    Spawn(String),
    #[error("listing failed for {path}: {message}")]
    Listing { path: PathBuf, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the adapter needs to launch one copy job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_id: JobId,
    pub chunk: Chunk,
    pub log_path: PathBuf,
    pub options: CopyOptions,
    pub dry_run: bool,
    pub verbose: bool,
    /// Inter-packet gap from the bandwidth governor; None disables pacing.
    pub pacing_gap_ms: Option<u64>,
}

/// One entry from the engine's list-only output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub size: u64,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// A running copy job owned by the scheduler's active map.
#[async_trait]
pub trait CopyJob: Send {
    fn job_id(&self) -> JobId;

    fn log_path(&self) -> &Path;

    /// Non-blocking exit test. Some(code) once the process has exited.
    fn poll_exit(&mut self) -> Option<i32>;

    /// Kill the process, waiting at most `grace` for it to go away.
    async fn terminate(&mut self, grace: Duration);

    /// Best-effort progress from the live log tail; None when unavailable.
    fn progress(&mut self, now_ms: u64) -> Option<ProgressSample>;
}

/// The per-chunk copy engine contract (one external process per chunk).
#[async_trait]
pub trait CopyEngine: Send + Sync {
    /// Verify the engine binary is invocable. Called once at run start.
    async fn preflight(&self) -> Result<(), CopyEngineError>;

    /// Spawn one copy job for one chunk.
    async fn start(&self, request: JobRequest) -> Result<Box<dyn CopyJob>, CopyEngineError>;

    /// Classify a finished job: parse the log, map the exit code.
    ///
    /// Never fails; an unreadable log yields an outcome with empty stats and
    /// the read error as its message.
    async fn complete(
        &self,
        job: &mut dyn CopyJob,
        exit_code: i32,
        options: &CopyOptions,
    ) -> CopyOutcome;

    /// Enumerate a subtree via the engine's list-only mode.
    ///
    /// The directory profiler uses this so profiling and copying share one
    /// enumeration.
    async fn list(
        &self,
        root: &Path,
        options: &CopyOptions,
    ) -> Result<Vec<ListEntry>, CopyEngineError>;
}
