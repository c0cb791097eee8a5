// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-level settings installed at `Orchestrator::start`.

use crate::profile::Profile;
use serde::{Deserialize, Serialize};

/// Upper bound on the worker pool size.
pub const MAX_CONCURRENT_JOBS: u32 = 128;

/// Settings for one replication run over an ordered list of profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Profiles are executed sequentially in this order.
    pub profiles: Vec<Profile>,
    /// Worker pool size, clamped to 1..=MAX_CONCURRENT_JOBS.
    pub max_concurrent_jobs: u32,
    /// Aggregate cap across all concurrent jobs; 0 disables pacing.
    pub bandwidth_limit_mbps: u32,
    pub dry_run: bool,
    pub verbose_logging: bool,
    /// Start fresh even when a checkpoint file exists.
    pub ignore_checkpoint: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            max_concurrent_jobs: 4,
            bandwidth_limit_mbps: 0,
            dry_run: false,
            verbose_logging: false,
            ignore_checkpoint: false,
        }
    }
}

impl RunSettings {
    /// Clamp out-of-range values instead of rejecting them.
    pub fn normalize(mut self) -> Self {
        self.max_concurrent_jobs = self.max_concurrent_jobs.clamp(1, MAX_CONCURRENT_JOBS);
        self
    }
}

crate::builder! {
    pub struct RunSettingsBuilder => RunSettings {
        set {
            profiles: Vec<Profile> = Vec::new(),
            max_concurrent_jobs: u32 = 2,
            bandwidth_limit_mbps: u32 = 0,
            dry_run: bool = false,
            verbose_logging: bool = false,
            ignore_checkpoint: bool = false,
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
