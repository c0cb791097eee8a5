// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stand-in provider for hosts without snapshot primitives.
//!
//! Profiles that ask for snapshot isolation fall back to the raw source
//! (the engine treats that as a warning, not an error).

use super::{SnapshotError, SnapshotProvider};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use vmir_core::SnapshotInfo;

/// Provider that supports no volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSnapshot;

#[async_trait]
impl SnapshotProvider for UnsupportedSnapshot {
    fn is_supported(&self, _path: &Path) -> bool {
        false
    }

    async fn preflight(&self) -> Result<(), SnapshotError> {
        Err(SnapshotError::ServiceUnavailable("no snapshot provider on this host".to_string()))
    }

    async fn create(&self, source: &Path) -> Result<SnapshotInfo, SnapshotError> {
        Err(SnapshotError::Unsupported(source.to_path_buf()))
    }

    fn translate(&self, original: &Path, _snapshot: &SnapshotInfo) -> PathBuf {
        original.to_path_buf()
    }

    async fn remove(&self, _shadow_id: &str) -> Result<(), SnapshotError> {
        Ok(())
    }

    async fn enumerate(&self) -> Result<Vec<SnapshotInfo>, SnapshotError> {
        Ok(Vec::new())
    }
}
