// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for scheduler and orchestrator tests.

use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use std::path::PathBuf;
use std::time::Duration;
use vmir_adapters::{FakeCopyEngine, FakeSnapshotProvider, ListEntry};
use vmir_core::{FakeClock, Profile, RunSettings};

pub(crate) type TestOrchestrator =
    Orchestrator<FakeCopyEngine, FakeSnapshotProvider, FakeClock>;

/// A disk-backed test run: real temp dirs for sources (the profile
/// preflight stats them), fakes for everything else.
pub(crate) struct TestRun {
    pub dir: tempfile::TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
    pub engine: FakeCopyEngine,
    pub snapshots: FakeSnapshotProvider,
    pub clock: FakeClock,
}

impl TestRun {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {}", e));
        let source = dir.path().join("src");
        let dest = dir.path().join("dst");
        std::fs::create_dir_all(&source).unwrap_or_else(|e| panic!("mkdir: {}", e));
        Self {
            dir,
            source,
            dest,
            engine: FakeCopyEngine::new(),
            snapshots: FakeSnapshotProvider::new(),
            clock: FakeClock::new(),
        }
    }

    /// Create another real source directory under the temp root.
    pub fn add_source(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).unwrap_or_else(|e| panic!("mkdir: {}", e));
        path
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn profile(&self, name: &str) -> Profile {
        Profile::new(name, &self.source, &self.dest)
    }

    pub fn settings(&self, profiles: Vec<Profile>, max_jobs: u32) -> RunSettings {
        RunSettings {
            profiles,
            max_concurrent_jobs: max_jobs,
            ..RunSettings::default()
        }
    }

    pub fn config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            state_dir: self.state_dir(),
            health_interval_ms: 1,
            ..OrchestratorConfig::default()
        }
    }

    pub async fn orchestrator(&self, settings: RunSettings) -> TestOrchestrator {
        self.orchestrator_with(settings, self.config()).await
    }

    pub async fn orchestrator_with(
        &self,
        settings: RunSettings,
        config: OrchestratorConfig,
    ) -> TestOrchestrator {
        Orchestrator::start(
            settings,
            self.engine.clone(),
            self.snapshots.clone(),
            self.clock.clone(),
            config,
        )
        .await
        .unwrap_or_else(|e| panic!("orchestrator start: {}", e))
    }

    /// Tick until the run is terminal, advancing the clock between ticks.
    pub async fn drive(&self, orchestrator: &TestOrchestrator, max_ticks: u32) {
        for _ in 0..max_ticks {
            if orchestrator.is_terminal() {
                return;
            }
            orchestrator.tick().await;
            self.clock.advance(Duration::from_millis(100));
        }
        assert!(
            orchestrator.is_terminal(),
            "run not terminal after {} ticks (phase {})",
            max_ticks,
            orchestrator.state().phase()
        );
    }
}

/// Root-relative listing entries from (size, path) pairs; paths ending in
/// '/' are directories.
pub(crate) fn listing(entries: &[(u64, &str)]) -> Vec<ListEntry> {
    entries
        .iter()
        .map(|(size, path)| ListEntry {
            size: *size,
            path: PathBuf::from(path.trim_end_matches('/')),
            is_dir: path.ends_with('/'),
        })
        .collect()
}
