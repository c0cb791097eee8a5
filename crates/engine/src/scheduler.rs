// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tick loop: reap → dispatch → finalize-profile? → emit progress.
//!
//! Tick never blocks on a running job (exits are polled) and never unwinds;
//! every failure path lands in the state's error queue and the loop keeps
//! going. The run always ends in Complete or Stopped.

use crate::orchestrator::Orchestrator;
use crate::state::ActiveJob;
use chrono::Utc;
use vmir_adapters::{CopyEngine, JobRequest, SnapshotProvider};
use vmir_core::{
    Chunk, ChunkStatus, Clock, CopyOutcome, JobId, ProfileResult, RunPhase,
};
use vmir_storage::HealthRecord;

impl<E, S, C> Orchestrator<E, S, C>
where
    E: CopyEngine,
    S: SnapshotProvider,
    C: Clock,
{
    /// One scheduler iteration with the run's configured concurrency.
    pub async fn tick(&self) {
        self.tick_with_limit(self.settings.max_concurrent_jobs).await;
    }

    /// One scheduler iteration with an explicit concurrency ceiling.
    pub async fn tick_with_limit(&self, max_concurrent_jobs: u32) {
        if self.state.phase().is_terminal() {
            return;
        }

        if self.state.stop_requested() {
            self.stop_all_jobs().await;
            return;
        }

        if !self.state.pause_requested() {
            self.reap_completions().await;
            self.dispatch_jobs(max_concurrent_jobs.max(1) as usize).await;
            self.state.sample_active_progress(self.clock.epoch_ms());

            if self.state.phase() == RunPhase::Replicating
                && self.state.pending_len() == 0
                && self.state.active_len() == 0
            {
                self.finalize_profile().await;
            }
        }

        self.emit_progress();
    }

    /// Reap every active job whose process has exited. Claiming is the
    /// `remove_active` call: only one reaper gets the job.
    async fn reap_completions(&self) {
        let exited = self.state.poll_active_exits();
        if exited.is_empty() {
            return;
        }
        let options = self.state.current_copy_options().unwrap_or_default();

        for (job_id, exit_code) in exited {
            let Some(mut active) = self.state.remove_active(job_id) else {
                continue; // another reaper claimed it
            };
            let outcome =
                self.engine.complete(active.job.as_mut(), exit_code, &options).await;
            let mut chunk = active.chunk;
            chunk.last_exit_code = Some(outcome.exit_code);

            tracing::debug!(
                job_id = %job_id,
                chunk_id = %chunk.id,
                exit_code,
                class = %outcome.class,
                "job reaped"
            );

            let chunk = if outcome.class.is_failure() {
                self.handle_chunk_failure(chunk, outcome.should_retry, &outcome.message)
            } else {
                chunk.status = outcome.chunk_status();
                self.record_chunk_success(&chunk, &outcome);
                chunk
            };
            self.hooks.fire_chunk_complete(&chunk, &outcome);
        }
    }

    /// Success accounting: counters, completed-path record for the
    /// checkpoint, breaker reset, checkpoint policy.
    fn record_chunk_success(&self, chunk: &Chunk, outcome: &CopyOutcome) {
        self.state.add_completed_chunk_bytes(chunk.estimated_bytes);
        self.state.add_completed_chunk_files(outcome.stats.files_copied);
        self.state.add_bytes_complete(chunk.estimated_bytes);
        self.completed_paths.lock().insert(self.checkpoint_key(&chunk.source));
        self.breaker.lock().record_success();
        self.state.push_completed(chunk.clone());
        let completed = self.state.add_completed_count(1);
        self.state.push_log(format!(
            "chunk {} {} ({} files, {} bytes)",
            chunk.id, chunk.status, outcome.stats.files_copied, outcome.stats.bytes_copied
        ));

        // First completion, then every Kth.
        if completed == 1 || completed % self.checkpoint_every == 0 {
            self.save_checkpoint();
        }
    }

    /// Route a failed chunk: back off and re-enqueue when retryable, else
    /// terminal Failed with a breaker check. Saves the checkpoint either
    /// way (the safer documented policy).
    fn handle_chunk_failure(
        &self,
        mut chunk: Chunk,
        should_retry: bool,
        message: &str,
    ) -> Chunk {
        let now = self.clock.epoch_ms();

        if should_retry && chunk.register_failure(&self.retry, now, message) {
            let delay = self.retry.backoff(chunk.retry_count);
            tracing::warn!(
                chunk_id = %chunk.id,
                retry = chunk.retry_count,
                delay_ms = delay.as_millis() as u64,
                error = message,
                "chunk failed, retry scheduled"
            );
            self.state.push_log(format!(
                "chunk {} failed ({}), retry {} in {}s",
                chunk.id,
                message,
                chunk.retry_count,
                delay.as_secs()
            ));
            self.state.push_pending(chunk.clone());
        } else {
            chunk.status = ChunkStatus::Failed;
            chunk.last_error = Some(message.to_string());
            tracing::error!(chunk_id = %chunk.id, error = message, "chunk failed permanently");
            self.state.push_error(format!(
                "chunk {}: {}: {}",
                chunk.id,
                chunk.source.display(),
                message
            ));
            self.state.push_failed(chunk.clone());
            self.failed_count.fetch_add(1, std::sync::atomic::Ordering::AcqRel);
            self.state.add_completed_count(1);

            let tripped = {
                let mut breaker = self.breaker.lock();
                let tripped = breaker.record_failure(&format!("chunk {}", chunk.id));
                if tripped {
                    self.state.push_error(format!(
                        "circuit breaker tripped: {}",
                        breaker.reason().unwrap_or("consecutive failures")
                    ));
                }
                tripped
            };
            if tripped {
                tracing::error!("circuit breaker tripped, stopping run");
                self.state.request_stop();
            }
        }

        self.save_checkpoint();
        chunk
    }

    /// Launch pending chunks until the pool is full. Resume hits are
    /// skipped without launching; deferred retries go back to the tail.
    async fn dispatch_jobs(&self, max_concurrent_jobs: usize) {
        let now = self.clock.epoch_ms();
        // Each pending chunk is considered at most once per tick; deferred
        // retries re-enqueued at the tail must not spin this loop.
        let mut budget = self.state.pending_len();

        while budget > 0
            && self.state.active_len() < max_concurrent_jobs
            && !self.state.stop_requested()
        {
            budget -= 1;
            let Some(mut chunk) = self.state.pop_pending() else {
                break;
            };

            let identity = self.checkpoint_key(&chunk.source);
            if self.resume.contains(std::path::Path::new(&identity)) {
                chunk.status = ChunkStatus::Skipped;
                self.state.add_skipped_chunk(chunk.estimated_bytes);
                self.state.add_completed_count(1);
                self.state.push_log(format!("chunk {} skipped (resume)", chunk.id));
                self.state.push_completed(chunk);
                continue;
            }

            if !chunk.ready_at(now) {
                self.state.push_pending(chunk);
                continue;
            }

            let job_id = JobId(
                self.next_job_id.fetch_add(1, std::sync::atomic::Ordering::AcqRel) + 1,
            );
            let pacing = self.governor.pacing_gap_ms(self.state.active_len());
            chunk.status = ChunkStatus::Running;
            let request = JobRequest {
                job_id,
                chunk: chunk.clone(),
                log_path: self.log_dir.join(format!("job-{}.log", job_id)),
                options: self.state.current_copy_options().unwrap_or_default(),
                dry_run: self.settings.dry_run,
                verbose: self.settings.verbose_logging,
                pacing_gap_ms: pacing,
            };

            match self.engine.start(request).await {
                Ok(job) => {
                    tracing::debug!(job_id = %job_id, chunk_id = %chunk.id, "job dispatched");
                    self.state.insert_active(
                        job_id,
                        ActiveJob { job, chunk, started_ms: now, sample: None },
                    );
                }
                Err(e) => {
                    // No job ran, so observers get no chunk-complete event;
                    // permanent start failures still surface via the error queue.
                    tracing::warn!(chunk_id = %chunk.id, error = %e, "job start failed");
                    self.handle_chunk_failure(chunk, true, &format!("start failed: {}", e));
                }
            }
        }
    }

    /// Stop path: terminate every active process with a bounded wait,
    /// release the snapshot, mark the run Stopped. Pending chunks stay
    /// untouched (they are not in the checkpoint, so resume finds them).
    async fn stop_all_jobs(&self) {
        let jobs = self.state.drain_active();
        tracing::info!(active = jobs.len(), "stop requested, terminating active jobs");
        for mut active in jobs {
            active.job.terminate(self.process_stop_timeout).await;
            self.state.push_log(format!(
                "job {} terminated (chunk {})",
                active.job.job_id(),
                active.chunk.id
            ));
        }

        self.release_current_snapshot().await;
        self.state.set_phase(RunPhase::Stopped);
        let record = self.health_record();
        let _ = self.health.write_forced(&record, self.clock.epoch_ms());
        self.state.push_log("replication run stopped".to_string());
        tracing::info!(session_id = %self.session_id, "replication run stopped");
    }

    /// Current profile fully drained: emit its result, release the
    /// snapshot, advance to the next profile or complete the run.
    async fn finalize_profile(&self) {
        let now = self.clock.epoch_ms();
        let failed = self.state.failed_snapshot();
        let errors: Vec<String> = failed
            .iter()
            .map(|c| format!("chunk {}: {}", c.id, c.source.display()))
            .collect();

        let result = ProfileResult {
            profile: self.state.current_profile().unwrap_or_default(),
            status: ProfileResult::status_for(failed.len() as u64, &errors),
            chunks_complete: self.state.completed_count(),
            chunks_failed: failed.len() as u64,
            chunks_skipped: self.state.skipped_chunk_count(),
            bytes_complete: self.state.completed_chunk_bytes(),
            elapsed_ms: now.saturating_sub(self.state.profile_start_ms()),
            errors,
        };

        self.release_current_snapshot().await;
        tracing::info!(
            profile = %result.profile,
            status = %result.status,
            chunks = result.chunks_complete,
            failed = result.chunks_failed,
            "profile finished"
        );
        self.state.push_profile_result(result.clone());
        self.hooks.fire_profile_complete(&result);
        self.save_checkpoint();

        let next = self.state.profile_index() + 1;
        if next < self.settings.profiles.len() {
            self.prepare_profile(next).await;
        } else {
            self.complete_run().await;
        }
    }

    /// End-of-tick progress: recompute the status, fire the progress hook,
    /// write the throttled health record.
    fn emit_progress(&self) {
        let status = self.status();
        self.hooks.fire_progress(&status);

        // The probe is removed on Complete; do not resurrect it.
        if status.phase == RunPhase::Complete {
            return;
        }
        let record = HealthRecord {
            updated_at: Utc::now(),
            phase: status.phase,
            completed_count: status.chunks_complete,
            total_chunks: status.chunks_total,
            current_profile: status.current_profile.clone(),
        };
        if let Err(e) = self.health.write_throttled(&record, self.clock.epoch_ms()) {
            tracing::warn!(error = %e, "health write failed");
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
