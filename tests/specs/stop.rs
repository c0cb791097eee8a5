// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative stop: active jobs terminated, pending work preserved.

use super::prelude::*;
use vmir_core::{ChunkLimits, RunPhase};

fn seven_chunk_profile(scenario: &Scenario, use_snapshot: bool) -> vmir_core::Profile {
    let mut profile = scenario.profile("big");
    profile.limits = ChunkLimits { max_bytes: 100, max_files: 10, max_depth: 3 };
    profile.use_snapshot = use_snapshot;
    let mut files: Vec<(u64, String)> = Vec::new();
    for i in 0..7 {
        files.push((0, format!("d{}/", i)));
        files.push((100, format!("d{}/f.bin", i)));
    }
    let refs: Vec<(u64, &str)> = files.iter().map(|(s, p)| (*s, p.as_str())).collect();
    scenario.listing(&profile, &refs);
    profile
}

#[tokio::test]
async fn stop_terminates_jobs_releases_the_snapshot_and_keeps_pending() {
    let scenario = Scenario::new();
    let profile = seven_chunk_profile(&scenario, true);
    // jobs linger so two stay active when the stop arrives
    scenario.engine.set_linger_polls(u32::MAX);
    // with a snapshot, the scan root is the translated device path
    scenario.engine.set_listing("/shadow/dev1", {
        let mut entries = Vec::new();
        for i in 0..7 {
            entries.push(vmir_adapters::ListEntry {
                size: 0,
                path: format!("d{}", i).into(),
                is_dir: true,
            });
            entries.push(vmir_adapters::ListEntry {
                size: 100,
                path: format!("d{}/f.bin", i).into(),
                is_dir: false,
            });
        }
        entries
    });

    let orchestrator = scenario.start(scenario.settings(vec![profile], 2)).await;
    orchestrator.tick().await;
    assert_eq!(orchestrator.state().active_len(), 2);
    assert_eq!(orchestrator.state().pending_len(), 5);
    assert_eq!(scenario.snapshots.live_ids().len(), 1);

    orchestrator.request_stop();
    orchestrator.tick().await;

    let state = orchestrator.state();
    assert_eq!(state.phase(), RunPhase::Stopped);
    // both active processes were terminated within the bounded wait
    assert_eq!(scenario.engine.terminated_jobs().len(), 2);
    assert_eq!(state.active_len(), 0);
    // the snapshot was released on the stop path
    assert!(scenario.snapshots.live_ids().is_empty());
    assert_eq!(scenario.snapshots.removed_ids(), vec!["shadow-1".to_string()]);
    // pending chunks left intact
    assert_eq!(state.pending_len(), 5);

    // ticking a terminal run is a no-op
    orchestrator.tick().await;
    assert_eq!(state.phase(), RunPhase::Stopped);
}

#[tokio::test]
async fn a_stopped_runs_unfinished_chunks_execute_on_the_next_run() {
    let scenario = Scenario::new();
    let profile = seven_chunk_profile(&scenario, false);
    scenario.engine.set_linger_polls(u32::MAX);

    let first = scenario.start(scenario.settings(vec![profile.clone()], 2)).await;
    first.tick().await;
    first.request_stop();
    first.tick().await;
    assert_eq!(first.state().phase(), RunPhase::Stopped);
    drop(first);

    // nothing completed, so nothing lands in the resume set: the next run
    // executes all seven chunks
    scenario.engine.set_linger_polls(0);
    let second = scenario.start(scenario.settings(vec![profile], 2)).await;
    scenario.drive(&second).await;

    let state = second.state();
    assert_eq!(state.phase(), RunPhase::Complete);
    assert_eq!(state.skipped_chunk_count(), 0);
    assert_eq!(state.completed_count(), 7);
}
