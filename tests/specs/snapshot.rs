// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot lifecycle, fallback, and the bootstrap orphan sweep.

use super::prelude::*;
use vmir_adapters::FakeSnapshotProvider;
use vmir_core::{ProfileStatus, RunPhase, SnapshotInfo};
use vmir_engine::Orchestrator;

#[tokio::test]
async fn snapshot_is_created_used_and_released_exactly_once() {
    let scenario = Scenario::new();
    let mut profile = scenario.profile("snap");
    profile.use_snapshot = true;
    // the scan and the copies run against the translated device path
    scenario.engine.set_listing(
        "/shadow/dev1",
        vec![vmir_adapters::ListEntry { size: 100, path: "f.bin".into(), is_dir: false }],
    );

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    assert_eq!(scenario.snapshots.live_ids(), vec!["shadow-1".to_string()]);

    scenario.drive(&orchestrator).await;

    assert_eq!(orchestrator.state().phase(), RunPhase::Complete);
    // exactly one Remove for the one Create, before the run left Replicating
    assert_eq!(scenario.snapshots.removed_ids(), vec!["shadow-1".to_string()]);
    assert!(scenario.snapshots.live_ids().is_empty());
    // the job copied from the translated path
    assert_eq!(
        scenario.engine.started_sources(),
        vec![std::path::PathBuf::from("/shadow/dev1")]
    );
}

#[tokio::test]
async fn unsupported_source_proceeds_without_a_snapshot() {
    let scenario = Scenario::new();
    let snapshots = FakeSnapshotProvider::unsupported();
    let mut profile = scenario.profile("raw");
    profile.use_snapshot = true;
    scenario.listing(&profile, &[(100, "f.bin")]);

    let orchestrator = Orchestrator::start(
        scenario.settings(vec![profile.clone()], 1),
        scenario.engine.clone(),
        snapshots.clone(),
        scenario.clock.clone(),
        scenario.config(),
    )
    .await
    .unwrap();
    scenario.drive(&orchestrator).await;

    let state = orchestrator.state();
    assert_eq!(state.phase(), RunPhase::Complete);
    // no Create call was made; planning and copying used the raw source
    assert_eq!(snapshots.create_count(), 0);
    assert_eq!(scenario.engine.started_sources(), vec![profile.source.clone()]);
    assert_eq!(state.profile_results_snapshot()[0].status, ProfileStatus::Success);
    let logs = state.drain_logs();
    assert!(logs.iter().any(|l| l.contains("unsupported")));
}

#[tokio::test]
async fn bootstrap_removes_shadows_a_crashed_run_left_behind() {
    let scenario = Scenario::new();
    let profile = scenario.profile("p");
    scenario.listing(&profile, &[(100, "f.bin")]);

    let tracker = vmir_storage::ShadowTracker::new(scenario.state_dir());
    tracker.record("stale-1").unwrap();
    tracker.record("stale-2").unwrap();
    scenario.snapshots.seed_live(SnapshotInfo {
        shadow_id: "stale-1".to_string(),
        device_path: "/shadow/old1".into(),
        source_volume: "/gone".to_string(),
        created_at_ms: 0,
    });
    scenario.snapshots.seed_live(SnapshotInfo {
        shadow_id: "stale-2".to_string(),
        device_path: "/shadow/old2".into(),
        source_volume: "/gone".to_string(),
        created_at_ms: 0,
    });

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;

    // both orphans removed and the tracking file cleared at bootstrap
    assert_eq!(
        scenario.snapshots.removed_ids(),
        vec!["stale-1".to_string(), "stale-2".to_string()]
    );
    assert!(scenario.snapshots.live_ids().is_empty());
    assert!(tracker.list().unwrap().is_empty());

    scenario.drive(&orchestrator).await;
    assert_eq!(orchestrator.state().phase(), RunPhase::Complete);
}
