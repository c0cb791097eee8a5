// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two profiles, all copies succeed.

use super::prelude::*;
use vmir_core::{ChunkLimits, ProfileStatus, RunPhase};

const GB: u64 = 1 << 30;
const MB: u64 = 1 << 20;

#[tokio::test]
async fn two_profiles_complete_cleanly() {
    let scenario = Scenario::new();

    // P1: three subtrees of 1 GB / 2 GB / 1 GB, split at a 2 GB budget
    let mut p1 = scenario.profile("p1");
    p1.limits = ChunkLimits { max_bytes: 2 * GB, max_files: 1_000, max_depth: 3 };
    scenario.listing(
        &p1,
        &[
            (0, "c1/"),
            (GB, "c1/data.bin"),
            (0, "c2/"),
            (2 * GB, "c2/data.bin"),
            (0, "c3/"),
            (GB, "c3/data.bin"),
        ],
    );

    // P2: two subtrees of 500 MB, split at a 500 MB budget
    let mut p2 = scenario.profile("p2");
    p2.limits = ChunkLimits { max_bytes: 500 * MB, max_files: 1_000, max_depth: 3 };
    scenario.listing(
        &p2,
        &[(0, "d1/"), (500 * MB, "d1/data.bin"), (0, "d2/"), (500 * MB, "d2/data.bin")],
    );

    let orchestrator = scenario.start(scenario.settings(vec![p1, p2], 2)).await;
    // phase sequence: the run is Replicating as soon as start returns...
    assert_eq!(orchestrator.state().phase(), RunPhase::Replicating);
    assert_eq!(orchestrator.state().totals().0, 3);

    scenario.drive(&orchestrator).await;

    // ...and ends Complete
    let state = orchestrator.state();
    assert_eq!(state.phase(), RunPhase::Complete);

    let results = state.profile_results_snapshot();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].profile, "p1");
    assert_eq!(results[0].chunks_complete, 3);
    assert_eq!(results[0].status, ProfileStatus::Success);
    assert_eq!(results[1].profile, "p2");
    assert_eq!(results[1].chunks_complete, 2);

    // 5 GB moved across the run
    assert_eq!(state.bytes_complete(), 5 * GB);

    // checkpoint file deleted on Complete
    let store = vmir_storage::CheckpointStore::new(scenario.state_dir());
    assert!(store.load().unwrap().is_none());
    assert!(!store.path().exists());

    // health probe removed with it
    assert!(!scenario.state_dir().join("health.json").exists());

    let status = orchestrator.status();
    assert_eq!(status.overall_progress, 100.0);
    assert_eq!(status.chunks_failed, 0);
}
