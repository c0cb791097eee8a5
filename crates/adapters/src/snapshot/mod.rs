// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volume-snapshot provider contract.
//!
//! The concrete snapshot primitives (VSS or otherwise) live outside this
//! workspace; the engine consumes this trait. [`RetryingSnapshot`] adds the
//! transient-failure retry contract around any provider.

mod retry;
mod unsupported;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use retry::{is_transient_error, RetryingSnapshot};
pub use unsupported::UnsupportedSnapshot;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vmir_core::SnapshotInfo;

/// Errors from the snapshot provider.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshots not supported for {0}")]
    Unsupported(PathBuf),
    #[error("snapshot service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("snapshot create failed: {0}")]
    Create(String),
    #[error("snapshot remove failed for {shadow_id}: {message}")]
    Remove { shadow_id: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Provider of read-only point-in-time volume images.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Whether the path's volume can be snapshotted (false for remote paths).
    fn is_supported(&self, path: &Path) -> bool;

    /// Verify elevation and service reachability before the first create of
    /// a run. Failure disables snapshot use for the run (not fatal).
    async fn preflight(&self) -> Result<(), SnapshotError>;

    async fn create(&self, source: &Path) -> Result<SnapshotInfo, SnapshotError>;

    /// Rebase `original` onto the snapshot's device path.
    fn translate(&self, original: &Path, snapshot: &SnapshotInfo) -> PathBuf;

    /// Idempotent: removing an unknown shadow id succeeds.
    async fn remove(&self, shadow_id: &str) -> Result<(), SnapshotError>;

    /// All live snapshots this provider knows about.
    async fn enumerate(&self) -> Result<Vec<SnapshotInfo>, SnapshotError>;
}
