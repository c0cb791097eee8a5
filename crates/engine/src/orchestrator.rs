// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run bootstrap and control surface.
//!
//! `Orchestrator::start` validates the copy engine, sweeps orphaned
//! snapshots, installs run settings and the resume set, and prepares the
//! first profile. The tick loop itself lives in [`crate::scheduler`].

use crate::breaker::CircuitBreaker;
use crate::error::RuntimeError;
use crate::governor::BandwidthGovernor;
use crate::hooks::ObserverHooks;
use crate::planner::{plan_chunks, ChunkIdGen};
use crate::profiler::{DirectoryProfiler, ProfileCache};
use crate::state::OrchestrationState;
use crate::status::{compute_status, OrchestrationStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vmir_adapters::{CopyEngine, SnapshotProvider};
use vmir_core::{
    Clock, Profile, ProfileResult, ProfileStatus, RetryPolicy, RunPhase, RunSettings,
};
use vmir_storage::{
    Checkpoint, CheckpointStore, HealthWriter, ResumeSet, ShadowTracker,
    CHECKPOINT_SCHEMA_VERSION,
};

/// Tuning knobs installed at run start.
pub struct OrchestratorConfig {
    /// Directory for checkpoint, health, shadow tracking and job logs.
    pub state_dir: PathBuf,
    pub retry: RetryPolicy,
    pub breaker_threshold: u32,
    /// Save the checkpoint every Kth completion (besides the first and
    /// every failure).
    pub checkpoint_every: u64,
    pub health_interval_ms: u64,
    /// Per-process wait when terminating active jobs on stop.
    pub process_stop_timeout: Duration,
    /// Remove snapshots a crashed previous run left behind.
    pub sweep_orphans: bool,
    /// Attach to a pre-initialized shared state without resetting it
    /// (callers that share the state with a UI thread).
    pub skip_initialization: bool,
    pub shared_state: Option<Arc<OrchestrationState>>,
    pub hooks: ObserverHooks,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            state_dir: vmir_storage::default_state_dir(),
            retry: RetryPolicy::default(),
            breaker_threshold: CircuitBreaker::DEFAULT_THRESHOLD,
            checkpoint_every: 10,
            health_interval_ms: HealthWriter::DEFAULT_INTERVAL_MS,
            process_stop_timeout: Duration::from_secs(10),
            sweep_orphans: true,
            skip_initialization: false,
            shared_state: None,
            hooks: ObserverHooks::default(),
        }
    }
}

/// Per-profile root mapping: chunks are planned against `scan_root` (the
/// snapshot-translated path when one exists); checkpoint entries always use
/// the untranslated source so resume survives across snapshots.
pub(crate) struct ProfileRoots {
    pub scan_root: PathBuf,
    pub source_root: PathBuf,
}

/// The replication orchestrator: one instance per run.
pub struct Orchestrator<E, S, C> {
    pub(crate) state: Arc<OrchestrationState>,
    pub(crate) engine: E,
    pub(crate) snapshots: S,
    pub(crate) clock: C,
    pub(crate) settings: RunSettings,
    pub(crate) retry: RetryPolicy,
    pub(crate) checkpoint_every: u64,
    pub(crate) process_stop_timeout: Duration,
    pub(crate) checkpoints: CheckpointStore,
    pub(crate) tracker: ShadowTracker,
    pub(crate) health: HealthWriter,
    pub(crate) profiler: DirectoryProfiler,
    pub(crate) breaker: Mutex<CircuitBreaker>,
    pub(crate) governor: BandwidthGovernor,
    pub(crate) resume: ResumeSet,
    pub(crate) hooks: ObserverHooks,
    pub(crate) chunk_ids: Mutex<ChunkIdGen>,
    pub(crate) next_job_id: AtomicU64,
    pub(crate) session_id: String,
    pub(crate) run_started_at: DateTime<Utc>,
    pub(crate) snapshot_disabled: AtomicBool,
    pub(crate) snapshot_preflight_done: AtomicBool,
    pub(crate) roots: Mutex<Option<ProfileRoots>>,
    pub(crate) completed_paths: Mutex<BTreeSet<String>>,
    pub(crate) failed_count: AtomicU64,
    pub(crate) log_dir: PathBuf,
}

impl<E, S, C> Orchestrator<E, S, C>
where
    E: CopyEngine,
    S: SnapshotProvider,
    C: Clock,
{
    /// Install a run: validate the engine, sweep orphans, load the resume
    /// set, prepare profile 0. Fails only on infrastructure problems; once
    /// this returns Ok the run always ends in Complete or Stopped.
    pub async fn start(
        settings: RunSettings,
        engine: E,
        snapshots: S,
        clock: C,
        config: OrchestratorConfig,
    ) -> Result<Self, RuntimeError> {
        let settings = settings.normalize();
        if settings.profiles.is_empty() {
            return Err(RuntimeError::NoProfiles);
        }

        engine.preflight().await.map_err(RuntimeError::EnginePreflight)?;

        let state = config.shared_state.unwrap_or_else(|| Arc::new(OrchestrationState::new()));
        if !config.skip_initialization {
            state.reset();
        }

        let tracker = ShadowTracker::new(&config.state_dir);
        if config.sweep_orphans {
            sweep_orphans(&snapshots, &tracker).await;
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        let checkpoints = CheckpointStore::new(&config.state_dir);
        let mut completed_paths = BTreeSet::new();

        let resume = if settings.ignore_checkpoint {
            ResumeSet::default()
        } else {
            match checkpoints.load() {
                Ok(Some(checkpoint)) => {
                    completed_paths.extend(checkpoint.completed_source_paths.iter().cloned());
                    state.push_log(format!(
                        "resuming: {} completed chunks from session {}",
                        checkpoint.completed_source_paths.len(),
                        checkpoint.session_id
                    ));
                    ResumeSet::from_checkpoint(&checkpoint)
                }
                Ok(None) => ResumeSet::default(),
                Err(e) => {
                    tracing::warn!(error = %e, "checkpoint load failed, starting fresh");
                    ResumeSet::default()
                }
            }
        };

        let governor = BandwidthGovernor::new(settings.bandwidth_limit_mbps);
        let log_dir = vmir_storage::log_dir(&config.state_dir)
            .join(session_id.get(..8).unwrap_or(&session_id));

        let orchestrator = Self {
            state,
            engine,
            snapshots,
            clock,
            settings,
            retry: config.retry,
            checkpoint_every: config.checkpoint_every.max(1),
            process_stop_timeout: config.process_stop_timeout,
            checkpoints,
            tracker,
            health: HealthWriter::with_interval(&config.state_dir, config.health_interval_ms),
            // Fresh cache per run: profiling never reuses a previous run's scans.
            profiler: DirectoryProfiler::new(Arc::new(ProfileCache::new())),
            breaker: Mutex::new(CircuitBreaker::new(config.breaker_threshold)),
            governor,
            resume,
            hooks: config.hooks,
            chunk_ids: Mutex::new(ChunkIdGen::new()),
            next_job_id: AtomicU64::new(0),
            session_id,
            run_started_at: Utc::now(),
            snapshot_disabled: AtomicBool::new(false),
            snapshot_preflight_done: AtomicBool::new(false),
            roots: Mutex::new(None),
            completed_paths: Mutex::new(completed_paths),
            failed_count: AtomicU64::new(0),
            log_dir,
        };

        orchestrator.state.set_start_ms(orchestrator.clock.epoch_ms());
        orchestrator.state.set_phase(RunPhase::Preparing);
        tracing::info!(
            session_id = %orchestrator.session_id,
            profiles = orchestrator.settings.profiles.len(),
            max_jobs = orchestrator.settings.max_concurrent_jobs,
            dry_run = orchestrator.settings.dry_run,
            "replication run starting"
        );
        orchestrator.prepare_profile(0).await;
        Ok(orchestrator)
    }

    // --- control surface ---

    pub fn request_stop(&self) {
        self.state.request_stop();
    }

    pub fn request_pause(&self) {
        self.state.request_pause();
    }

    pub fn request_resume(&self) {
        self.state.clear_pause();
    }

    pub fn status(&self) -> OrchestrationStatus {
        compute_status(&self.state, self.settings.profiles.len(), self.clock.epoch_ms())
    }

    pub fn state(&self) -> Arc<OrchestrationState> {
        Arc::clone(&self.state)
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_terminal(&self) -> bool {
        self.state.phase().is_terminal()
    }

    // --- per-profile bootstrap ---

    /// Prepare the first runnable profile at or after `start_index`:
    /// preflight → optional snapshot → profile → plan → enqueue. Profiles
    /// whose preflight fails are skipped with a Warning result; when no
    /// profile is left the run completes.
    pub(crate) async fn prepare_profile(&self, start_index: usize) {
        let profile_count = self.settings.profiles.len();
        for index in start_index..profile_count {
            let profile = self.settings.profiles[index].clone();
            let now = self.clock.epoch_ms();
            self.state.set_profile_index(index);
            self.state.set_current_profile(Some(profile.name.clone()));
            self.state.set_profile_start_ms(now);
            self.state.set_phase(RunPhase::Preparing);

            if tokio::fs::metadata(&profile.source).await.is_err() {
                self.skip_profile(
                    &profile,
                    format!(
                        "profile '{}': source inaccessible: {}",
                        profile.name,
                        profile.source.display()
                    ),
                );
                continue;
            }

            let scan_root = if profile.use_snapshot {
                self.acquire_snapshot(&profile).await
            } else {
                profile.source.clone()
            };
            *self.roots.lock() = Some(ProfileRoots {
                scan_root: scan_root.clone(),
                source_root: profile.source.clone(),
            });

            let dir_profile = match self
                .profiler
                .profile(&self.engine, &scan_root, &profile.copy, now)
                .await
            {
                Ok(p) => p,
                Err(e) => {
                    self.release_current_snapshot().await;
                    self.skip_profile(
                        &profile,
                        format!("profile '{}': scan failed: {}", profile.name, e),
                    );
                    continue;
                }
            };

            if let Ok(available) = fs2::available_space(&profile.destination) {
                if available < dir_profile.total_bytes {
                    self.state.push_log(format!(
                        "profile '{}': destination may be low on space ({} available, {} needed)",
                        profile.name, available, dir_profile.total_bytes
                    ));
                }
            }

            let chunks = {
                let mut ids = self.chunk_ids.lock();
                plan_chunks(
                    &dir_profile.entries,
                    &scan_root,
                    &profile.destination,
                    &profile.limits,
                    profile.scan_mode,
                    &mut ids,
                )
            };

            let total_bytes: u64 = chunks.iter().map(|c| c.estimated_bytes).sum();
            self.state.reset_for_new_profile();
            self.state.set_totals(chunks.len() as u64, total_bytes);
            self.state.set_profile_start_files(dir_profile.file_count);
            self.state.set_current_copy_options(Some(profile.copy.clone()));
            let chunk_count = chunks.len();
            for chunk in chunks {
                self.state.push_pending(chunk);
            }
            self.state.set_phase(RunPhase::Replicating);
            self.state.push_log(format!(
                "profile '{}': {} chunks, {} bytes",
                profile.name, chunk_count, total_bytes
            ));
            tracing::info!(
                profile = %profile.name,
                chunks = chunk_count,
                bytes = total_bytes,
                scan_root = %scan_root.display(),
                "profile prepared"
            );
            self.save_checkpoint();
            return;
        }

        self.complete_run().await;
    }

    /// Record a skipped profile (preflight or scan failure) and move on.
    fn skip_profile(&self, profile: &Profile, message: String) {
        tracing::warn!(profile = %profile.name, "{}", message);
        self.state.push_error(message.clone());
        let result = ProfileResult {
            profile: profile.name.clone(),
            status: ProfileStatus::Warning,
            chunks_complete: 0,
            chunks_failed: 0,
            chunks_skipped: 0,
            bytes_complete: 0,
            elapsed_ms: 0,
            errors: vec![message],
        };
        self.state.push_profile_result(result.clone());
        self.hooks.fire_profile_complete(&result);
    }

    /// Create the profile's snapshot when possible; fall back to the raw
    /// source on any failure (warn, never fatal).
    async fn acquire_snapshot(&self, profile: &Profile) -> PathBuf {
        let source = profile.source.clone();

        if self.snapshot_disabled.load(Ordering::Acquire) {
            self.state.push_log(format!(
                "profile '{}': snapshots disabled for this run, using raw source",
                profile.name
            ));
            return source;
        }

        if !self.snapshots.is_supported(&source) {
            tracing::warn!(
                profile = %profile.name,
                source = %source.display(),
                "snapshots unsupported for source, using raw source"
            );
            self.state.push_log(format!(
                "profile '{}': snapshots unsupported for {}, using raw source",
                profile.name,
                source.display()
            ));
            return source;
        }

        if !self.snapshot_preflight_done.swap(true, Ordering::AcqRel) {
            if let Err(e) = self.snapshots.preflight().await {
                self.snapshot_disabled.store(true, Ordering::Release);
                tracing::warn!(error = %e, "snapshot preflight failed, disabling snapshots for this run");
                self.state.push_log(format!(
                    "snapshot preflight failed ({}), continuing without snapshot isolation",
                    e
                ));
                return source;
            }
        }

        match self.snapshots.create(&source).await {
            Ok(snapshot) => {
                if let Err(e) = self.tracker.record(&snapshot.shadow_id) {
                    tracing::warn!(error = %e, shadow_id = %snapshot.shadow_id, "shadow tracking failed");
                }
                let translated = self.snapshots.translate(&source, &snapshot);
                self.state.push_log(format!(
                    "profile '{}': snapshot {} created",
                    profile.name, snapshot.shadow_id
                ));
                self.state.set_current_snapshot(Some(snapshot));
                translated
            }
            Err(e) => {
                tracing::warn!(profile = %profile.name, error = %e, "snapshot create failed, using raw source");
                self.state.push_log(format!(
                    "profile '{}': snapshot create failed ({}), using raw source",
                    profile.name, e
                ));
                source
            }
        }
    }

    /// Release the profile's snapshot on any exit path. Idempotent.
    pub(crate) async fn release_current_snapshot(&self) {
        if let Some(snapshot) = self.state.take_current_snapshot() {
            if let Err(e) = self.snapshots.remove(&snapshot.shadow_id).await {
                tracing::warn!(shadow_id = %snapshot.shadow_id, error = %e, "snapshot remove failed");
                self.state.push_error(format!(
                    "snapshot {} could not be removed: {}",
                    snapshot.shadow_id, e
                ));
            }
            if let Err(e) = self.tracker.forget(&snapshot.shadow_id) {
                tracing::warn!(shadow_id = %snapshot.shadow_id, error = %e, "shadow untracking failed");
            }
            self.state.push_log(format!("snapshot {} released", snapshot.shadow_id));
        }
    }

    // --- checkpointing ---

    /// The checkpoint identity of a chunk: its source rebased from the scan
    /// root onto the profile's untranslated source.
    pub(crate) fn checkpoint_key(&self, chunk_source: &Path) -> String {
        let roots = self.roots.lock();
        match roots.as_ref() {
            Some(r) => match chunk_source.strip_prefix(&r.scan_root) {
                Ok(rest) if rest.as_os_str().is_empty() => r.source_root.display().to_string(),
                Ok(rest) => r.source_root.join(rest).display().to_string(),
                Err(_) => chunk_source.display().to_string(),
            },
            None => chunk_source.display().to_string(),
        }
    }

    /// Persist progress. Never fails the tick; dry runs do not touch the
    /// checkpoint (a listing pass must not poison real-run resume).
    pub(crate) fn save_checkpoint(&self) {
        if self.settings.dry_run {
            return;
        }
        let checkpoint = Checkpoint {
            schema_version: CHECKPOINT_SCHEMA_VERSION.to_string(),
            session_id: self.session_id.clone(),
            saved_at: Utc::now(),
            profile_index: self.state.profile_index(),
            current_profile_name: self.state.current_profile().unwrap_or_default(),
            completed_source_paths: self.completed_paths.lock().iter().cloned().collect(),
            completed_count: self.completed_paths.lock().len() as u64,
            failed_count: self.failed_count.load(Ordering::Acquire),
            bytes_complete: self.state.bytes_complete(),
            start_time: self.run_started_at,
        };
        if let Err(e) = self.checkpoints.save(&checkpoint) {
            tracing::warn!(error = %e, "checkpoint save failed");
            self.state.push_error(format!("checkpoint save failed: {}", e));
        }
    }

    /// Terminal success path: checkpoint deleted, final health record,
    /// probe removed, phase Complete.
    pub(crate) async fn complete_run(&self) {
        self.release_current_snapshot().await;
        if !self.settings.dry_run {
            if let Err(e) = self.checkpoints.remove() {
                tracing::warn!(error = %e, "checkpoint removal failed");
            }
        }
        self.state.set_current_profile(None);
        self.state.set_phase(RunPhase::Complete);
        let record = self.health_record();
        let _ = self.health.write_forced(&record, self.clock.epoch_ms());
        let _ = self.health.remove();
        self.state.push_log("replication run complete".to_string());
        tracing::info!(session_id = %self.session_id, "replication run complete");
    }

    pub(crate) fn health_record(&self) -> vmir_storage::HealthRecord {
        let (total_chunks, _) = self.state.totals();
        vmir_storage::HealthRecord {
            updated_at: Utc::now(),
            phase: self.state.phase(),
            completed_count: self.state.completed_count(),
            total_chunks,
            current_profile: self.state.current_profile(),
        }
    }
}

/// Remove snapshots a crashed previous run left behind, then clear the
/// tracking file.
async fn sweep_orphans<S: SnapshotProvider>(snapshots: &S, tracker: &ShadowTracker) {
    let ids = match tracker.list() {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(error = %e, "shadow tracking file unreadable, skipping orphan sweep");
            return;
        }
    };
    if ids.is_empty() {
        return;
    }
    tracing::info!(count = ids.len(), "removing orphaned snapshots from a previous run");
    for shadow_id in &ids {
        if let Err(e) = snapshots.remove(shadow_id).await {
            tracing::warn!(shadow_id = %shadow_id, error = %e, "orphan snapshot remove failed");
        }
    }
    if let Err(e) = tracker.clear() {
        tracing::warn!(error = %e, "shadow tracking file clear failed");
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
