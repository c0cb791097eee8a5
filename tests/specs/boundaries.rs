// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boundary behaviors: empty trees, zero-byte chunks, dry-run planning.

use super::prelude::*;
use vmir_core::RunPhase;

#[tokio::test]
async fn an_empty_source_still_mirrors_one_zero_byte_chunk() {
    let scenario = Scenario::new();
    let profile = scenario.profile("empty");
    scenario.listing(&profile, &[]);

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    assert_eq!(orchestrator.state().totals(), (1, 0));

    scenario.drive(&orchestrator).await;

    let state = orchestrator.state();
    assert_eq!(state.phase(), RunPhase::Complete);
    // the zero-byte chunk drove completedCount but not bytesComplete
    assert_eq!(state.completed_count(), 1);
    assert_eq!(state.bytes_complete(), 0);
    assert_eq!(orchestrator.status().profile_progress, 100.0);
}

#[tokio::test]
async fn dry_run_and_real_run_plan_the_same_chunks() {
    let scenario = Scenario::new();
    let mut profile = scenario.profile("repeat");
    profile.limits = vmir_core::ChunkLimits { max_bytes: 100, max_files: 10, max_depth: 3 };
    scenario.listing(
        &profile,
        &[(0, "a/"), (100, "a/f.bin"), (0, "b/"), (100, "b/f.bin"), (5, "loose.txt")],
    );

    let mut dry = scenario.settings(vec![profile.clone()], 1);
    dry.dry_run = true;
    let first = scenario.start(dry).await;
    scenario.drive(&first).await;
    let dry_sources = scenario.engine.started_sources();
    drop(first);

    let second = scenario.start(scenario.settings(vec![profile], 1)).await;
    scenario.drive(&second).await;
    let all_sources = scenario.engine.started_sources();

    // same chunk set, same order, both runs
    let real_sources = &all_sources[dry_sources.len()..];
    assert_eq!(real_sources, dry_sources.as_slice());
    assert_eq!(dry_sources.len(), 3);

    // the dry run left no checkpoint behind to poison the real run
    assert_eq!(second.state().skipped_chunk_count(), 0);
}
