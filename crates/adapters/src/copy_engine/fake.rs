// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted copy engine for scheduler and scenario tests.
//!
//! Outcomes are scripted per chunk source path; each dispatch consumes the
//! next scripted outcome for that path (so a retried chunk can fail twice
//! then succeed). Listings back the directory profiler without disk I/O.

use super::{CopyEngine, CopyEngineError, CopyJob, JobRequest, ListEntry};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vmir_core::{CopyOptions, CopyOutcome, ExitClass, JobId, JobStats, ProgressSample};

/// One scripted job result.
#[derive(Debug, Clone)]
pub struct ScriptedOutcome {
    pub exit_code: i32,
    pub class: ExitClass,
    pub should_retry: bool,
    pub message: String,
    pub stats: JobStats,
}

impl ScriptedOutcome {
    pub fn success(bytes: u64, files: u64) -> Self {
        Self {
            exit_code: 1,
            class: ExitClass::Success,
            should_retry: false,
            message: "copy completed".to_string(),
            stats: JobStats { files_copied: files, bytes_copied: bytes },
        }
    }

    pub fn retryable_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: 8,
            class: ExitClass::Error,
            should_retry: true,
            message: message.into(),
            stats: JobStats::default(),
        }
    }

    pub fn permanent_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: 16,
            class: ExitClass::Fatal,
            should_retry: false,
            message: message.into(),
            stats: JobStats::default(),
        }
    }
}

#[derive(Default)]
struct FakeEngineState {
    outcomes: HashMap<PathBuf, VecDeque<ScriptedOutcome>>,
    listings: HashMap<PathBuf, Vec<ListEntry>>,
    /// Outcome handed to `complete` for each started job.
    pending: HashMap<JobId, ScriptedOutcome>,
    /// Sources that fail at `start` (count of failures to inject).
    start_failures: HashMap<PathBuf, u32>,
    /// How many polls a job stays running before reporting its exit.
    linger_polls: u32,
    started: Vec<(JobId, PathBuf)>,
    terminated: Vec<JobId>,
    preflight_error: Option<String>,
}

/// Copy engine whose jobs complete according to a script.
#[derive(Clone, Default)]
pub struct FakeCopyEngine {
    state: Arc<Mutex<FakeEngineState>>,
}

impl FakeCopyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next job whose chunk source is `source`.
    pub fn script(&self, source: impl Into<PathBuf>, outcome: ScriptedOutcome) {
        self.state.lock().outcomes.entry(source.into()).or_default().push_back(outcome);
    }

    /// Provide the listing the engine returns for `root`.
    pub fn set_listing(&self, root: impl Into<PathBuf>, entries: Vec<ListEntry>) {
        self.state.lock().listings.insert(root.into(), entries);
    }

    /// Make the next `count` starts for `source` fail with a spawn error.
    pub fn fail_start(&self, source: impl Into<PathBuf>, count: u32) {
        self.state.lock().start_failures.insert(source.into(), count);
    }

    /// Keep jobs "running" for this many polls before they exit.
    pub fn set_linger_polls(&self, polls: u32) {
        self.state.lock().linger_polls = polls;
    }

    pub fn set_preflight_error(&self, message: impl Into<String>) {
        self.state.lock().preflight_error = Some(message.into());
    }

    /// Sources of all started jobs, in dispatch order.
    pub fn started_sources(&self) -> Vec<PathBuf> {
        self.state.lock().started.iter().map(|(_, p)| p.clone()).collect()
    }

    /// Jobs killed through `terminate`.
    pub fn terminated_jobs(&self) -> Vec<JobId> {
        self.state.lock().terminated.clone()
    }
}

#[async_trait]
impl CopyEngine for FakeCopyEngine {
    async fn preflight(&self) -> Result<(), CopyEngineError> {
        match self.state.lock().preflight_error.clone() {
            Some(message) => Err(CopyEngineError::NotInvocable(message)),
            None => Ok(()),
        }
    }

    async fn start(&self, request: JobRequest) -> Result<Box<dyn CopyJob>, CopyEngineError> {
        let mut state = self.state.lock();
        let source = request.chunk.source.clone();

        if let Some(remaining) = state.start_failures.get_mut(&source) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CopyEngineError::Spawn(format!(
                    "scripted start failure for {}",
                    source.display()
                )));
            }
        }

        let outcome = state
            .outcomes
            .get_mut(&source)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                ScriptedOutcome::success(request.chunk.estimated_bytes, request.chunk.estimated_files)
            });

        let job = FakeJob {
            job_id: request.job_id,
            log_path: request.log_path,
            exit_code: outcome.exit_code,
            polls_left: state.linger_polls,
            engine: self.state.clone(),
        };
        state.pending.insert(request.job_id, outcome);
        state.started.push((request.job_id, source));
        Ok(Box::new(job))
    }

    async fn complete(
        &self,
        job: &mut dyn CopyJob,
        exit_code: i32,
        _options: &CopyOptions,
    ) -> CopyOutcome {
        let scripted = self.state.lock().pending.remove(&job.job_id());
        match scripted {
            Some(outcome) => CopyOutcome {
                class: outcome.class,
                should_retry: outcome.should_retry,
                exit_code,
                message: outcome.message,
                stats: outcome.stats,
            },
            None => CopyOutcome {
                class: ExitClass::Fatal,
                should_retry: false,
                exit_code,
                message: "no scripted outcome".to_string(),
                stats: JobStats::default(),
            },
        }
    }

    async fn list(
        &self,
        root: &Path,
        _options: &CopyOptions,
    ) -> Result<Vec<ListEntry>, CopyEngineError> {
        self.state.lock().listings.get(root).cloned().ok_or_else(|| CopyEngineError::Listing {
            path: root.to_path_buf(),
            message: "no scripted listing".to_string(),
        })
    }
}

struct FakeJob {
    job_id: JobId,
    log_path: PathBuf,
    exit_code: i32,
    polls_left: u32,
    engine: Arc<Mutex<FakeEngineState>>,
}

#[async_trait]
impl CopyJob for FakeJob {
    fn job_id(&self) -> JobId {
        self.job_id
    }

    fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn poll_exit(&mut self) -> Option<i32> {
        if self.polls_left > 0 {
            self.polls_left -= 1;
            return None;
        }
        Some(self.exit_code)
    }

    async fn terminate(&mut self, _grace: Duration) {
        self.engine.lock().terminated.push(self.job_id);
    }

    fn progress(&mut self, _now_ms: u64) -> Option<ProgressSample> {
        None
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
