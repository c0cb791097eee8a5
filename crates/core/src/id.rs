// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numeric identifiers for chunks and copy jobs.
//!
//! Both are monotonic per run: the orchestrator resets the counters at run
//! start, so ids are stable across a dry-run/real-run pair over the same
//! inputs.

use serde::{Deserialize, Serialize};

/// Unique identifier for a planned chunk (monotonic within a run).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChunkId(pub u64);

impl ChunkId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChunkId {
    fn from(v: u64) -> Self {
        ChunkId(v)
    }
}

/// Unique identifier for a dispatched copy job (monotonic within a run).
///
/// A chunk that is retried gets a fresh job id for each attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(v: u64) -> Self {
        JobId(v)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
