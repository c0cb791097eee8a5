// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn progress_for_a_half_done_profile() {
    let state = OrchestrationState::new();
    state.set_phase(RunPhase::Replicating);
    state.set_totals(10, 1_000);
    state.add_completed_count(5);
    state.set_profile_index(0);

    let status = compute_status(&state, 2, 1_000);
    assert_eq!(status.profile_progress, 50.0);
    // profile 1 of 2, half done → 25% overall
    assert_eq!(status.overall_progress, 25.0);
}

#[test]
fn zero_chunk_profile_reports_full_progress() {
    let state = OrchestrationState::new();
    state.set_phase(RunPhase::Replicating);
    state.set_totals(0, 0);

    let status = compute_status(&state, 1, 0);
    assert_eq!(status.profile_progress, 100.0);
    assert_eq!(status.chunks_total, 0);
}

#[test]
fn complete_phase_pins_progress_to_100() {
    let state = OrchestrationState::new();
    state.set_phase(RunPhase::Complete);
    state.set_totals(10, 100);

    let status = compute_status(&state, 3, 0);
    assert_eq!(status.profile_progress, 100.0);
    assert_eq!(status.overall_progress, 100.0);
}

#[test]
fn elapsed_is_measured_from_run_start() {
    let state = OrchestrationState::new();
    state.set_start_ms(1_000);
    let status = compute_status(&state, 1, 6_000);
    assert_eq!(status.elapsed_ms, 5_000);
}

#[test]
fn eta_from_observed_rate() {
    let state = OrchestrationState::new();
    state.set_phase(RunPhase::Replicating);
    state.set_totals(4, 1_000);
    state.set_profile_start_ms(0);
    state.add_completed_chunk_bytes(500);
    state.add_completed_count(2);

    // 500 bytes in 2000 ms → 0.25 b/ms → 500 remaining → 2000 ms
    let status = compute_status(&state, 1, 2_000);
    assert_eq!(status.eta_ms, Some(2_000));
}

#[test]
fn eta_is_none_without_a_rate() {
    let state = OrchestrationState::new();
    state.set_totals(4, 1_000);
    let status = compute_status(&state, 1, 2_000);
    assert_eq!(status.eta_ms, None);
}

#[test]
fn failed_chunks_are_counted() {
    let state = OrchestrationState::new();
    state.push_failed(vmir_core::Chunk::builder().build());
    let status = compute_status(&state, 1, 0);
    assert_eq!(status.chunks_failed, 1);
}
