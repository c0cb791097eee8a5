// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for the scenario specs.

use std::path::PathBuf;
use std::time::Duration;
use vmir_adapters::{FakeCopyEngine, FakeSnapshotProvider, ListEntry};
use vmir_core::{FakeClock, Profile, RunSettings};
use vmir_engine::{Orchestrator, OrchestratorConfig};

pub type SpecOrchestrator = Orchestrator<FakeCopyEngine, FakeSnapshotProvider, FakeClock>;

/// One replication scenario: real temp dirs for sources, fakes elsewhere.
pub struct Scenario {
    pub dir: tempfile::TempDir,
    pub engine: FakeCopyEngine,
    pub snapshots: FakeSnapshotProvider,
    pub clock: FakeClock,
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            engine: FakeCopyEngine::new(),
            snapshots: FakeSnapshotProvider::new(),
            clock: FakeClock::new(),
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// A real on-disk source directory plus its profile.
    pub fn profile(&self, name: &str) -> Profile {
        let source = self.dir.path().join(name);
        std::fs::create_dir_all(&source).unwrap();
        Profile::new(name, source, self.dir.path().join(format!("{}-dst", name)))
    }

    /// Script a listing of (size, relative path) files for a profile source.
    pub fn listing(&self, profile: &Profile, files: &[(u64, &str)]) {
        let entries: Vec<ListEntry> = files
            .iter()
            .map(|(size, path)| ListEntry {
                size: *size,
                path: PathBuf::from(path.trim_end_matches('/')),
                is_dir: path.ends_with('/'),
            })
            .collect();
        self.engine.set_listing(&profile.source, entries);
    }

    pub fn settings(&self, profiles: Vec<Profile>, max_jobs: u32) -> RunSettings {
        RunSettings { profiles, max_concurrent_jobs: max_jobs, ..RunSettings::default() }
    }

    pub fn config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            state_dir: self.state_dir(),
            health_interval_ms: 1,
            // persist after every completion so kill-at-any-point scenarios
            // see all prior progress
            checkpoint_every: 1,
            ..OrchestratorConfig::default()
        }
    }

    pub async fn start(&self, settings: RunSettings) -> SpecOrchestrator {
        Orchestrator::start(
            settings,
            self.engine.clone(),
            self.snapshots.clone(),
            self.clock.clone(),
            self.config(),
        )
        .await
        .unwrap()
    }

    /// Tick until terminal, advancing the clock far enough to clear any
    /// retry backoff between ticks.
    pub async fn drive(&self, orchestrator: &SpecOrchestrator) {
        for _ in 0..200 {
            if orchestrator.is_terminal() {
                return;
            }
            orchestrator.tick().await;
            self.clock.advance(Duration::from_secs(15));
        }
        panic!("run never reached a terminal phase");
    }
}
