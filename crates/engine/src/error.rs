// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.
//!
//! Only `Orchestrator::start` surfaces these; once a run is installed the
//! tick loop never unwinds — failures are logged and queued for observers.

use std::path::PathBuf;
use thiserror::Error;
use vmir_adapters::{CopyEngineError, SnapshotError};
use vmir_storage::{CheckpointError, TrackerError};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no profiles configured")]
    NoProfiles,
    #[error("copy engine preflight failed: {0}")]
    EnginePreflight(#[source] CopyEngineError),
    #[error("profile source inaccessible: {0}")]
    SourceInaccessible(PathBuf),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
