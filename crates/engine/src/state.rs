// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared orchestration state: the single source of truth the scheduler
//! writes and observers read concurrently.
//!
//! Discipline: grouped scalars behind one coarse mutex, counters and control
//! flags as atomics, one lock per collection. Collections are drained in
//! place, never reference-swapped, so an observer holding a snapshot is
//! never racing a swap. Readers get a consistent view of each individual
//! field or collection, not a cross-field atomic view.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use vmir_adapters::CopyJob;
use vmir_core::{
    Chunk, CopyOptions, JobId, ProfileResult, ProgressSample, RunPhase, SnapshotInfo,
};

/// Oldest entries are dropped once a message queue reaches this size.
const MESSAGE_QUEUE_CAP: usize = 1000;

/// Scalars guarded together by one mutex.
#[derive(Default)]
struct Scalars {
    phase: RunPhase,
    profile_index: usize,
    total_chunks: u64,
    total_bytes: u64,
    current_profile: Option<String>,
    start_ms: u64,
    profile_start_ms: u64,
    current_snapshot: Option<SnapshotInfo>,
    current_copy_options: Option<CopyOptions>,
}

/// A dispatched job: the live process handle plus the chunk it owns.
pub struct ActiveJob {
    pub job: Box<dyn CopyJob>,
    pub chunk: Chunk,
    pub started_ms: u64,
    pub sample: Option<ProgressSample>,
}

/// Cloneable view of an active job for observers (no process handle).
#[derive(Debug, Clone)]
pub struct ActiveJobView {
    pub job_id: JobId,
    pub chunk: Chunk,
    pub started_ms: u64,
    pub sample: Option<ProgressSample>,
}

/// Thread-safe fact store shared between the scheduler and observers.
///
/// None of these operations can fail or block beyond a short internal lock.
#[derive(Default)]
pub struct OrchestrationState {
    scalars: Mutex<Scalars>,

    completed_count: AtomicU64,
    bytes_complete: AtomicU64,
    completed_chunk_bytes: AtomicU64,
    completed_chunk_files: AtomicU64,
    skipped_chunk_count: AtomicU64,
    skipped_chunk_bytes: AtomicU64,
    profile_start_files: AtomicU64,

    stop_requested: AtomicBool,
    pause_requested: AtomicBool,

    pending: Mutex<VecDeque<Chunk>>,
    active: Mutex<HashMap<JobId, ActiveJob>>,
    completed: Mutex<Vec<Chunk>>,
    failed: Mutex<Vec<Chunk>>,
    profile_results: Mutex<Vec<ProfileResult>>,
    error_messages: Mutex<VecDeque<String>>,
    log_messages: Mutex<VecDeque<String>>,
}

impl OrchestrationState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- grouped scalars ---

    pub fn phase(&self) -> RunPhase {
        self.scalars.lock().phase
    }

    pub fn set_phase(&self, phase: RunPhase) {
        self.scalars.lock().phase = phase;
    }

    pub fn profile_index(&self) -> usize {
        self.scalars.lock().profile_index
    }

    pub fn set_profile_index(&self, index: usize) {
        self.scalars.lock().profile_index = index;
    }

    pub fn totals(&self) -> (u64, u64) {
        let s = self.scalars.lock();
        (s.total_chunks, s.total_bytes)
    }

    pub fn set_totals(&self, total_chunks: u64, total_bytes: u64) {
        let mut s = self.scalars.lock();
        s.total_chunks = total_chunks;
        s.total_bytes = total_bytes;
    }

    pub fn current_profile(&self) -> Option<String> {
        self.scalars.lock().current_profile.clone()
    }

    pub fn set_current_profile(&self, name: Option<String>) {
        self.scalars.lock().current_profile = name;
    }

    pub fn start_ms(&self) -> u64 {
        self.scalars.lock().start_ms
    }

    pub fn set_start_ms(&self, ms: u64) {
        self.scalars.lock().start_ms = ms;
    }

    pub fn profile_start_ms(&self) -> u64 {
        self.scalars.lock().profile_start_ms
    }

    pub fn set_profile_start_ms(&self, ms: u64) {
        self.scalars.lock().profile_start_ms = ms;
    }

    pub fn current_snapshot(&self) -> Option<SnapshotInfo> {
        self.scalars.lock().current_snapshot.clone()
    }

    pub fn set_current_snapshot(&self, snapshot: Option<SnapshotInfo>) {
        self.scalars.lock().current_snapshot = snapshot;
    }

    /// Take ownership of the current snapshot (release path).
    pub fn take_current_snapshot(&self) -> Option<SnapshotInfo> {
        self.scalars.lock().current_snapshot.take()
    }

    pub fn current_copy_options(&self) -> Option<CopyOptions> {
        self.scalars.lock().current_copy_options.clone()
    }

    pub fn set_current_copy_options(&self, options: Option<CopyOptions>) {
        self.scalars.lock().current_copy_options = options;
    }

    // --- counters ---

    pub fn completed_count(&self) -> u64 {
        self.completed_count.load(Ordering::Acquire)
    }

    /// Add and return the new value.
    pub fn add_completed_count(&self, n: u64) -> u64 {
        self.completed_count.fetch_add(n, Ordering::AcqRel) + n
    }

    pub fn bytes_complete(&self) -> u64 {
        self.bytes_complete.load(Ordering::Acquire)
    }

    /// Add and return the new value.
    pub fn add_bytes_complete(&self, n: u64) -> u64 {
        self.bytes_complete.fetch_add(n, Ordering::AcqRel) + n
    }

    pub fn completed_chunk_bytes(&self) -> u64 {
        self.completed_chunk_bytes.load(Ordering::Acquire)
    }

    pub fn add_completed_chunk_bytes(&self, n: u64) {
        self.completed_chunk_bytes.fetch_add(n, Ordering::AcqRel);
    }

    pub fn completed_chunk_files(&self) -> u64 {
        self.completed_chunk_files.load(Ordering::Acquire)
    }

    pub fn add_completed_chunk_files(&self, n: u64) {
        self.completed_chunk_files.fetch_add(n, Ordering::AcqRel);
    }

    pub fn skipped_chunk_count(&self) -> u64 {
        self.skipped_chunk_count.load(Ordering::Acquire)
    }

    pub fn add_skipped_chunk(&self, bytes: u64) {
        self.skipped_chunk_count.fetch_add(1, Ordering::AcqRel);
        self.skipped_chunk_bytes.fetch_add(bytes, Ordering::AcqRel);
    }

    pub fn skipped_chunk_bytes(&self) -> u64 {
        self.skipped_chunk_bytes.load(Ordering::Acquire)
    }

    pub fn profile_start_files(&self) -> u64 {
        self.profile_start_files.load(Ordering::Acquire)
    }

    pub fn set_profile_start_files(&self, n: u64) {
        self.profile_start_files.store(n, Ordering::Release);
    }

    // --- control flags ---

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    pub fn request_pause(&self) {
        self.pause_requested.store(true, Ordering::Release);
    }

    pub fn clear_pause(&self) {
        self.pause_requested.store(false, Ordering::Release);
    }

    pub fn pause_requested(&self) -> bool {
        self.pause_requested.load(Ordering::Acquire)
    }

    // --- pending queue ---

    pub fn push_pending(&self, chunk: Chunk) {
        self.pending.lock().push_back(chunk);
    }

    pub fn pop_pending(&self) -> Option<Chunk> {
        self.pending.lock().pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn pending_snapshot(&self) -> Vec<Chunk> {
        self.pending.lock().iter().cloned().collect()
    }

    // --- active jobs ---

    pub fn insert_active(&self, job_id: JobId, job: ActiveJob) {
        self.active.lock().insert(job_id, job);
    }

    /// Claim a job for reaping. Only one caller gets Some for a given id.
    pub fn remove_active(&self, job_id: JobId) -> Option<ActiveJob> {
        self.active.lock().remove(&job_id)
    }

    pub fn active_len(&self) -> usize {
        self.active.lock().len()
    }

    /// Poll every active job's exit without blocking.
    pub fn poll_active_exits(&self) -> Vec<(JobId, i32)> {
        let mut active = self.active.lock();
        let mut exited = Vec::new();
        for (job_id, entry) in active.iter_mut() {
            if let Some(code) = entry.job.poll_exit() {
                exited.push((*job_id, code));
            }
        }
        // Stable order so completion handling is deterministic under test.
        exited.sort_by_key(|(id, _)| *id);
        exited
    }

    /// Refresh the progress sample of every active job.
    pub fn sample_active_progress(&self, now_ms: u64) {
        let mut active = self.active.lock();
        for entry in active.values_mut() {
            if let Some(sample) = entry.job.progress(now_ms) {
                entry.sample = Some(sample);
            }
        }
    }

    /// Remove and return every active job (stop path).
    pub fn drain_active(&self) -> Vec<ActiveJob> {
        self.active.lock().drain().map(|(_, job)| job).collect()
    }

    /// Observer view of the active set.
    pub fn active_views(&self) -> Vec<ActiveJobView> {
        let active = self.active.lock();
        let mut views: Vec<ActiveJobView> = active
            .iter()
            .map(|(job_id, entry)| ActiveJobView {
                job_id: *job_id,
                chunk: entry.chunk.clone(),
                started_ms: entry.started_ms,
                sample: entry.sample,
            })
            .collect();
        views.sort_by_key(|v| v.job_id);
        views
    }

    // --- terminal collections ---

    pub fn push_completed(&self, chunk: Chunk) {
        self.completed.lock().push(chunk);
    }

    pub fn completed_len(&self) -> usize {
        self.completed.lock().len()
    }

    pub fn completed_snapshot(&self) -> Vec<Chunk> {
        self.completed.lock().clone()
    }

    pub fn push_failed(&self, chunk: Chunk) {
        self.failed.lock().push(chunk);
    }

    pub fn failed_len(&self) -> usize {
        self.failed.lock().len()
    }

    pub fn failed_snapshot(&self) -> Vec<Chunk> {
        self.failed.lock().clone()
    }

    pub fn push_profile_result(&self, result: ProfileResult) {
        self.profile_results.lock().push(result);
    }

    pub fn profile_results_snapshot(&self) -> Vec<ProfileResult> {
        self.profile_results.lock().clone()
    }

    // --- message queues ---

    pub fn push_error(&self, message: impl Into<String>) {
        let mut queue = self.error_messages.lock();
        if queue.len() >= MESSAGE_QUEUE_CAP {
            queue.pop_front();
        }
        queue.push_back(message.into());
    }

    pub fn drain_errors(&self) -> Vec<String> {
        self.error_messages.lock().drain(..).collect()
    }

    pub fn push_log(&self, message: impl Into<String>) {
        let mut queue = self.log_messages.lock();
        if queue.len() >= MESSAGE_QUEUE_CAP {
            queue.pop_front();
        }
        queue.push_back(message.into());
    }

    pub fn drain_logs(&self) -> Vec<String> {
        self.log_messages.lock().drain(..).collect()
    }

    // --- lifecycle ---

    /// Back to a blank run. Drains every collection in place.
    pub fn reset(&self) {
        *self.scalars.lock() = Scalars::default();
        self.completed_count.store(0, Ordering::Release);
        self.bytes_complete.store(0, Ordering::Release);
        self.completed_chunk_bytes.store(0, Ordering::Release);
        self.completed_chunk_files.store(0, Ordering::Release);
        self.skipped_chunk_count.store(0, Ordering::Release);
        self.skipped_chunk_bytes.store(0, Ordering::Release);
        self.profile_start_files.store(0, Ordering::Release);
        self.stop_requested.store(false, Ordering::Release);
        self.pause_requested.store(false, Ordering::Release);
        self.clear_chunk_collections();
        self.active.lock().clear();
        self.profile_results.lock().clear();
        self.error_messages.lock().clear();
        self.log_messages.lock().clear();
    }

    /// Reset the per-profile counters; run-scope state (bytes_complete,
    /// profile results, messages) survives.
    pub fn reset_for_new_profile(&self) {
        self.completed_count.store(0, Ordering::Release);
        self.completed_chunk_bytes.store(0, Ordering::Release);
        self.completed_chunk_files.store(0, Ordering::Release);
        self.skipped_chunk_count.store(0, Ordering::Release);
        self.skipped_chunk_bytes.store(0, Ordering::Release);
        self.profile_start_files.store(0, Ordering::Release);
        self.clear_chunk_collections();
    }

    /// Drain the chunk queues in place. Must not swap the collections:
    /// observers may hold snapshots taken from them.
    pub fn clear_chunk_collections(&self) {
        self.pending.lock().clear();
        self.completed.lock().clear();
        self.failed.lock().clear();
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
