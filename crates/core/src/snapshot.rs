// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volume snapshot handle owned by the profile currently running.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A read-only, point-in-time image of a source volume.
///
/// Created before a profile's scan, released on every profile exit path
/// (normal end, stop, or error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub shadow_id: String,
    /// Device path the provider exposes for reads (e.g. a shadow device root).
    pub device_path: PathBuf,
    /// Volume of the original source path (used to invert translation).
    pub source_volume: String,
    pub created_at_ms: u64,
}

crate::builder! {
    pub struct SnapshotInfoBuilder => SnapshotInfo {
        into {
            shadow_id: String = "shadow-1",
            device_path: PathBuf = "/shadow/dev1",
            source_volume: String = "/",
        }
        set {
            created_at_ms: u64 = 0,
        }
    }
}
