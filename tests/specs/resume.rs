// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resume after a crash: completed chunks are skipped, the rest execute.

use super::prelude::*;
use vmir_core::{ChunkLimits, ChunkStatus, RunPhase};

fn five_chunk_profile(scenario: &Scenario) -> vmir_core::Profile {
    let mut profile = scenario.profile("data");
    profile.limits = ChunkLimits { max_bytes: 100, max_files: 10, max_depth: 3 };
    scenario.listing(
        &profile,
        &[
            (0, "c1/"),
            (100, "c1/f.bin"),
            (0, "c2/"),
            (100, "c2/f.bin"),
            (0, "c3/"),
            (100, "c3/f.bin"),
            (0, "c4/"),
            (100, "c4/f.bin"),
            (0, "c5/"),
            (100, "c5/f.bin"),
        ],
    );
    profile
}

#[tokio::test]
async fn second_run_skips_what_the_first_completed() {
    let scenario = Scenario::new();
    let profile = five_chunk_profile(&scenario);

    // First run: complete three chunks, then the process dies (the
    // orchestrator is dropped without any stop or cleanup).
    let first = scenario.start(scenario.settings(vec![profile.clone()], 1)).await;
    for _ in 0..50 {
        if first.state().completed_count() >= 3 {
            break;
        }
        first.tick().await;
    }
    assert_eq!(first.state().completed_count(), 3);
    drop(first);

    // The checkpoint survived the crash with the three completed sources.
    let store = vmir_storage::CheckpointStore::new(scenario.state_dir());
    let checkpoint = store.load().unwrap().unwrap();
    assert_eq!(checkpoint.completed_source_paths.len(), 3);

    // Second run over the same inputs.
    let started_before = scenario.engine.started_sources().len();
    let second = scenario.start(scenario.settings(vec![profile.clone()], 1)).await;
    scenario.drive(&second).await;

    let state = second.state();
    assert_eq!(state.phase(), RunPhase::Complete);
    assert_eq!(state.skipped_chunk_count(), 3);
    assert_eq!(state.skipped_chunk_bytes(), 300);
    assert_eq!(state.completed_count(), 5);

    // skipped chunks were never launched again
    let launched: Vec<_> = scenario.engine.started_sources()[started_before..].to_vec();
    assert!(launched.iter().all(|s| s.ends_with("c4") || s.ends_with("c5")));

    // skipped chunks are terminal as Skipped
    let skipped: Vec<_> = state
        .completed_snapshot()
        .into_iter()
        .filter(|c| c.status == ChunkStatus::Skipped)
        .collect();
    assert_eq!(skipped.len(), 3);

    // a clean completion deletes the checkpoint
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn resume_matching_is_case_insensitive() {
    let scenario = Scenario::new();
    let profile = five_chunk_profile(&scenario);

    // Handcraft a checkpoint whose paths differ from the planned ones only
    // by case.
    let store = vmir_storage::CheckpointStore::new(scenario.state_dir());
    let mut checkpoint = vmir_storage::Checkpoint::new("previous");
    checkpoint.completed_source_paths = vec![
        profile.source.join("c1").display().to_string().to_uppercase(),
        profile.source.join("c2").display().to_string().to_uppercase(),
    ];
    store.save(&checkpoint).unwrap();

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    scenario.drive(&orchestrator).await;

    assert_eq!(orchestrator.state().skipped_chunk_count(), 2);
}
