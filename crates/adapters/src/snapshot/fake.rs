// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted snapshot provider for engine and scenario tests.

use super::{SnapshotError, SnapshotProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vmir_core::SnapshotInfo;

#[derive(Default)]
struct FakeSnapshotState {
    supported: bool,
    preflight_error: Option<String>,
    /// Error messages for upcoming create calls (consumed front-first).
    create_failures: VecDeque<String>,
    /// Shadow ids currently live (created and not yet removed).
    live: Vec<SnapshotInfo>,
    removed: Vec<String>,
    next_id: u64,
}

/// Snapshot provider whose behavior is scripted per test.
#[derive(Clone)]
pub struct FakeSnapshotProvider {
    state: Arc<Mutex<FakeSnapshotState>>,
}

impl Default for FakeSnapshotProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSnapshotProvider {
    /// A provider that supports every path.
    pub fn new() -> Self {
        let state = FakeSnapshotState { supported: true, next_id: 1, ..Default::default() };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// A provider that supports nothing (forces raw-source fallback).
    pub fn unsupported() -> Self {
        let provider = Self::new();
        provider.state.lock().supported = false;
        provider
    }

    pub fn set_preflight_error(&self, message: impl Into<String>) {
        self.state.lock().preflight_error = Some(message.into());
    }

    /// Queue a create failure; consumed before any success.
    pub fn fail_create(&self, message: impl Into<String>) {
        self.state.lock().create_failures.push_back(message.into());
    }

    /// Pre-seed a live snapshot (for orphan-sweep tests).
    pub fn seed_live(&self, snapshot: SnapshotInfo) {
        self.state.lock().live.push(snapshot);
    }

    /// Shadow ids currently live.
    pub fn live_ids(&self) -> Vec<String> {
        self.state.lock().live.iter().map(|s| s.shadow_id.clone()).collect()
    }

    /// Shadow ids removed so far, in order.
    pub fn removed_ids(&self) -> Vec<String> {
        self.state.lock().removed.clone()
    }

    pub fn create_count(&self) -> usize {
        self.state.lock().next_id as usize - 1
    }
}

#[async_trait]
impl SnapshotProvider for FakeSnapshotProvider {
    fn is_supported(&self, _path: &Path) -> bool {
        self.state.lock().supported
    }

    async fn preflight(&self) -> Result<(), SnapshotError> {
        match self.state.lock().preflight_error.clone() {
            Some(message) => Err(SnapshotError::ServiceUnavailable(message)),
            None => Ok(()),
        }
    }

    async fn create(&self, source: &Path) -> Result<SnapshotInfo, SnapshotError> {
        let mut state = self.state.lock();
        if let Some(message) = state.create_failures.pop_front() {
            return Err(SnapshotError::Create(message));
        }
        let id = state.next_id;
        state.next_id += 1;
        let snapshot = SnapshotInfo {
            shadow_id: format!("shadow-{}", id),
            device_path: PathBuf::from(format!("/shadow/dev{}", id)),
            source_volume: source.display().to_string(),
            created_at_ms: 0,
        };
        state.live.push(snapshot.clone());
        Ok(snapshot)
    }

    fn translate(&self, original: &Path, snapshot: &SnapshotInfo) -> PathBuf {
        match original.strip_prefix(&snapshot.source_volume) {
            Ok(rest) if rest.as_os_str().is_empty() => snapshot.device_path.clone(),
            Ok(rest) => snapshot.device_path.join(rest),
            Err(_) => original.to_path_buf(),
        }
    }

    async fn remove(&self, shadow_id: &str) -> Result<(), SnapshotError> {
        let mut state = self.state.lock();
        state.live.retain(|s| s.shadow_id != shadow_id);
        state.removed.push(shadow_id.to_string());
        Ok(())
    }

    async fn enumerate(&self) -> Result<Vec<SnapshotInfo>, SnapshotError> {
        Ok(self.state.lock().live.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
