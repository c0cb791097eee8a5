// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-directory resolution.

use std::path::PathBuf;

/// Default directory for checkpoint, health, shadow-track and job logs:
/// the platform state dir, falling back to the OS temp dir.
pub fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("vmir"))
        .unwrap_or_else(|| std::env::temp_dir().join("vmir"))
}

/// Job logs live next to the run state.
pub fn log_dir(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("logs")
}
