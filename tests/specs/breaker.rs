// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The circuit breaker stops a run whose failures are persistent.

use super::prelude::*;
use vmir_adapters::ScriptedOutcome;
use vmir_core::{ChunkLimits, RunPhase};

#[tokio::test]
async fn ten_consecutive_permanent_failures_stop_the_run() {
    let scenario = Scenario::new();
    let mut profile = scenario.profile("doomed");
    profile.limits = ChunkLimits { max_bytes: 100, max_files: 10, max_depth: 3 };

    let mut files: Vec<(u64, String)> = Vec::new();
    for i in 0..12 {
        files.push((0, format!("d{:02}/", i)));
        files.push((100, format!("d{:02}/f.bin", i)));
    }
    let refs: Vec<(u64, &str)> = files.iter().map(|(s, p)| (*s, p.as_str())).collect();
    scenario.listing(&profile, &refs);
    for i in 0..12 {
        scenario.engine.script(
            profile.source.join(format!("d{:02}", i)),
            ScriptedOutcome::permanent_failure("destination volume full"),
        );
    }

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    scenario.drive(&orchestrator).await;

    let state = orchestrator.state();
    assert_eq!(state.phase(), RunPhase::Stopped);
    assert_eq!(state.failed_len(), 10);
    // the two chunks behind the trip were never dispatched
    assert_eq!(state.pending_len(), 2);
    assert_eq!(scenario.engine.started_sources().len(), 10);

    let errors = state.drain_errors();
    assert!(errors.iter().any(|e| e.contains("circuit breaker tripped")));
    assert!(errors.iter().any(|e| e.contains("destination volume full")));
}

#[tokio::test]
async fn an_interspersed_success_prevents_the_trip() {
    let scenario = Scenario::new();
    let mut profile = scenario.profile("mixed");
    profile.limits = ChunkLimits { max_bytes: 100, max_files: 10, max_depth: 3 };

    let mut files: Vec<(u64, String)> = Vec::new();
    for i in 0..12 {
        files.push((0, format!("d{:02}/", i)));
        files.push((100, format!("d{:02}/f.bin", i)));
    }
    let refs: Vec<(u64, &str)> = files.iter().map(|(s, p)| (*s, p.as_str())).collect();
    scenario.listing(&profile, &refs);
    // nine failures, a success at d09, two more failures: never ten in a row
    for i in 0..12 {
        if i == 9 {
            continue; // unscripted → success
        }
        scenario.engine.script(
            profile.source.join(format!("d{:02}", i)),
            ScriptedOutcome::permanent_failure("still full"),
        );
    }

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    scenario.drive(&orchestrator).await;

    let state = orchestrator.state();
    assert_eq!(state.phase(), RunPhase::Complete);
    assert_eq!(state.failed_len(), 11);
    assert_eq!(state.completed_len(), 1);
}
