// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell copy engine: spawns one external mirror-tool process per chunk.
//!
//! The flag dialect below (mirror, thread count, in-job retry, pacing,
//! excludes, list-only, log file) is private to this module; nothing outside
//! the adapter sees a command line.

use super::log_parse;
use super::{classify_exit, CopyEngine, CopyEngineError, CopyJob, JobRequest, ListEntry};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use vmir_core::{CopyOptions, CopyOutcome, JobId, JobStats, ProgressSample};

/// Copy engine backed by an external robocopy-dialect binary.
pub struct ShellCopyEngine {
    program: PathBuf,
}

impl ShellCopyEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Build the per-job argument list. Never exposed beyond the adapter.
    fn build_args(request: &JobRequest) -> Vec<String> {
        let chunk = &request.chunk;
        let options = &request.options;
        let mut args = vec![
            chunk.source.display().to_string(),
            chunk.destination.display().to_string(),
        ];

        if chunk.recursive {
            args.push("/MIR".to_string());
        } else {
            // Loose-file chunk: top level only, still mirroring deletions.
            args.push("/LEV:1".to_string());
            args.push("/PURGE".to_string());
        }

        args.push(format!("/MT:{}", options.threads_per_job.max(1)));
        args.push(format!("/R:{}", options.retry_count));
        args.push(format!("/W:{}", options.retry_wait_secs));

        if let Some(gap_ms) = request.pacing_gap_ms {
            args.push(format!("/IPG:{}", gap_ms));
        }

        if !options.exclude_files.is_empty() {
            args.push("/XF".to_string());
            args.extend(options.exclude_files.iter().cloned());
        }
        if !options.exclude_dirs.is_empty() {
            args.push("/XD".to_string());
            args.extend(options.exclude_dirs.iter().cloned());
        }

        if request.dry_run {
            args.push("/L".to_string());
        }
        if request.verbose {
            args.push("/V".to_string());
            args.push("/TS".to_string());
        }

        args.push("/BYTES".to_string());
        args.push("/NP".to_string());
        args.push(format!("/LOG:{}", request.log_path.display()));

        args.extend(options.switches.iter().cloned());
        args
    }
}

#[async_trait]
impl CopyEngine for ShellCopyEngine {
    async fn preflight(&self) -> Result<(), CopyEngineError> {
        let spawned = Command::new(&self.program)
            .arg("/?")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match spawned {
            Ok(_) => Ok(()),
            Err(e) => {
                Err(CopyEngineError::NotInvocable(format!("{}: {}", self.program.display(), e)))
            }
        }
    }

    async fn start(&self, request: JobRequest) -> Result<Box<dyn CopyJob>, CopyEngineError> {
        if let Some(parent) = request.log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = Self::build_args(&request);
        tracing::debug!(
            job_id = %request.job_id,
            chunk_id = %request.chunk.id,
            source = %request.chunk.source.display(),
            "starting copy job"
        );

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CopyEngineError::Spawn(format!("{}: {}", self.program.display(), e)))?;

        Ok(Box::new(ShellCopyJob {
            job_id: request.job_id,
            child,
            log_path: request.log_path,
            last_sample: None,
        }))
    }

    async fn complete(
        &self,
        job: &mut dyn CopyJob,
        exit_code: i32,
        options: &CopyOptions,
    ) -> CopyOutcome {
        let classification = classify_exit(exit_code, options.mismatch_severity);

        let (stats, message) = match tokio::fs::read_to_string(job.log_path()).await {
            Ok(log) => {
                let summary = log_parse::parse_summary(&log);
                let message = match summary.errors.first() {
                    Some(first) => format!("{}; {}", classification.message, first),
                    None => classification.message.clone(),
                };
                (summary.stats, message)
            }
            Err(e) => {
                (JobStats::default(), format!("{}; log unreadable: {}", classification.message, e))
            }
        };

        CopyOutcome {
            class: classification.class,
            should_retry: classification.should_retry,
            exit_code,
            message: clip(message, 512),
            stats,
        }
    }

    async fn list(
        &self,
        root: &Path,
        options: &CopyOptions,
    ) -> Result<Vec<ListEntry>, CopyEngineError> {
        // List mode reads nothing from the destination; the dialect still
        // requires one, so the source doubles as it.
        let mut args = vec![
            root.display().to_string(),
            root.display().to_string(),
            "/L".to_string(),
            "/E".to_string(),
            "/BYTES".to_string(),
            "/NP".to_string(),
        ];
        if !options.exclude_files.is_empty() {
            args.push("/XF".to_string());
            args.extend(options.exclude_files.iter().cloned());
        }
        if !options.exclude_dirs.is_empty() {
            args.push("/XD".to_string());
            args.extend(options.exclude_dirs.iter().cloned());
        }

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CopyEngineError::Listing {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;

        let code = output.status.code().unwrap_or(-1);
        if code < 0 || code >= 16 {
            return Err(CopyEngineError::Listing {
                path: root.to_path_buf(),
                message: format!("list-only run exited {}", code),
            });
        }

        Ok(log_parse::parse_listing(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Bound a message at a char boundary at or below `max` bytes.
fn clip(mut message: String, max: usize) -> String {
    if message.len() > max {
        let mut end = max;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

/// A live child process and its log file.
struct ShellCopyJob {
    job_id: JobId,
    child: Child,
    log_path: PathBuf,
    /// (bytes, epoch ms) of the previous progress read, for rate estimation.
    last_sample: Option<(u64, u64)>,
}

#[async_trait]
impl CopyJob for ShellCopyJob {
    fn job_id(&self) -> JobId {
        self.job_id
    }

    fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn poll_exit(&mut self) -> Option<i32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.code().unwrap_or(-1)),
            Ok(None) => None,
            // The handle is gone; report a fatal synthetic exit so the
            // scheduler can reap instead of polling forever.
            Err(_) => Some(-1),
        }
    }

    async fn terminate(&mut self, grace: Duration) {
        if self.child.start_kill().is_err() {
            return; // already exited
        }
        let _ = tokio::time::timeout(grace, self.child.wait()).await;
    }

    fn progress(&mut self, now_ms: u64) -> Option<ProgressSample> {
        let log = std::fs::read_to_string(&self.log_path).ok()?;
        let bytes = log_parse::parse_progress_bytes(&log)?;

        let bytes_per_sec = match self.last_sample {
            Some((prev_bytes, prev_ms)) if now_ms > prev_ms && bytes >= prev_bytes => {
                (bytes - prev_bytes) * 1000 / (now_ms - prev_ms)
            }
            _ => 0,
        };
        self.last_sample = Some((bytes, now_ms));

        Some(ProgressSample { bytes_copied: bytes, bytes_per_sec, sampled_at_ms: now_ms })
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
