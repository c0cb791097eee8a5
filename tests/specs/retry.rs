// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retryable failures back off, then exhaust into Failed.

use super::prelude::*;
use std::time::Duration;
use vmir_adapters::ScriptedOutcome;
use vmir_core::{ChunkStatus, Clock, RunPhase};

#[tokio::test]
async fn three_retryable_failures_exhaust_into_failed() {
    let scenario = Scenario::new();
    let profile = scenario.profile("flaky");
    scenario.listing(&profile, &[(100, "f.bin")]);
    for _ in 0..3 {
        scenario
            .engine
            .script(&profile.source, ScriptedOutcome::retryable_failure("target busy"));
    }

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    scenario.drive(&orchestrator).await;

    let state = orchestrator.state();
    // the breaker saw one terminal failure, far from its threshold: the
    // run still ends Complete, not Stopped
    assert_eq!(state.phase(), RunPhase::Complete);

    let failed = state.failed_snapshot();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, ChunkStatus::Failed);
    // retry counts observed 1, 2, 3; the third is terminal
    assert_eq!(failed[0].retry_count, 3);
    assert_eq!(failed[0].last_error.as_deref(), Some("target busy"));

    let result = &state.profile_results_snapshot()[0];
    assert_eq!(result.chunks_failed, 1);
    assert_eq!(result.status, vmir_core::ProfileStatus::Warning);
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn a_deferred_retry_is_not_launched_before_its_deadline() {
    let scenario = Scenario::new();
    let profile = scenario.profile("flaky");
    scenario.listing(&profile, &[(100, "f.bin")]);
    scenario.engine.script(&profile.source, ScriptedOutcome::retryable_failure("blip"));
    scenario.engine.script(&profile.source, ScriptedOutcome::success(100, 1));

    let orchestrator = scenario.start(scenario.settings(vec![profile], 1)).await;
    orchestrator.tick().await; // dispatch
    orchestrator.tick().await; // reap the failure, schedule the retry

    let state = orchestrator.state();
    let deferred = &state.pending_snapshot()[0];
    assert_eq!(deferred.retry_count, 1);
    let deadline = deferred.retry_after_ms.unwrap();
    assert_eq!(deadline, scenario.clock.epoch_ms() + 5_000);

    // several ticks inside the backoff window: nothing launches
    for _ in 0..3 {
        orchestrator.tick().await;
        scenario.clock.advance(Duration::from_secs(1));
        assert_eq!(state.active_len(), 0);
    }

    scenario.clock.advance(Duration::from_secs(5));
    scenario.drive(&orchestrator).await;
    assert_eq!(state.phase(), RunPhase::Complete);
    assert_eq!(state.failed_len(), 0);
}
