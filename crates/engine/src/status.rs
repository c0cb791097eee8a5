// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer-facing status DTO derived from the shared state.

use crate::state::OrchestrationState;
use serde::Serialize;
use vmir_core::RunPhase;

/// Point-in-time status for UIs and the health probe.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationStatus {
    pub phase: RunPhase,
    pub current_profile: Option<String>,
    /// 0..=100 for the profile currently draining.
    pub profile_progress: f64,
    /// 0..=100 across all profiles, weighted equally.
    pub overall_progress: f64,
    pub bytes_complete: u64,
    pub elapsed_ms: u64,
    /// Estimated remaining time for the current profile, by observed rate.
    pub eta_ms: Option<u64>,
    pub chunks_complete: u64,
    pub chunks_total: u64,
    pub chunks_failed: u64,
}

/// Compute the status snapshot. `profile_count` is the run's profile total.
pub(crate) fn compute_status(
    state: &OrchestrationState,
    profile_count: usize,
    now_ms: u64,
) -> OrchestrationStatus {
    let phase = state.phase();
    let (chunks_total, total_bytes) = state.totals();
    let chunks_complete = state.completed_count();
    let chunks_failed = state.failed_len() as u64;

    let profile_progress = if phase == RunPhase::Complete {
        100.0
    } else if chunks_total == 0 {
        // a zero-chunk profile completes instantly
        100.0
    } else {
        (chunks_complete as f64 / chunks_total as f64 * 100.0).min(100.0)
    };

    let overall_progress = if phase == RunPhase::Complete {
        100.0
    } else if profile_count == 0 {
        0.0
    } else {
        ((state.profile_index() as f64 + profile_progress / 100.0) / profile_count as f64 * 100.0)
            .min(100.0)
    };

    let elapsed_ms = now_ms.saturating_sub(state.start_ms());

    let eta_ms = estimate_eta(
        state.completed_chunk_bytes(),
        total_bytes,
        now_ms.saturating_sub(state.profile_start_ms()),
    );

    OrchestrationStatus {
        phase,
        current_profile: state.current_profile(),
        profile_progress,
        overall_progress,
        bytes_complete: state.bytes_complete(),
        elapsed_ms,
        eta_ms,
        chunks_complete,
        chunks_total,
        chunks_failed,
    }
}

/// Remaining time from the observed byte rate; None until a rate exists.
fn estimate_eta(done_bytes: u64, total_bytes: u64, profile_elapsed_ms: u64) -> Option<u64> {
    if done_bytes == 0 || profile_elapsed_ms == 0 || total_bytes <= done_bytes {
        return None;
    }
    let rate = done_bytes as f64 / profile_elapsed_ms as f64; // bytes per ms
    let remaining = (total_bytes - done_bytes) as f64;
    Some((remaining / rate) as u64)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
