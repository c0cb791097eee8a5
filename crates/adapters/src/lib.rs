// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vmir-adapters: external-collaborator adapters for the replication engine.
//!
//! Two adapter families live here:
//! - [`copy_engine`]: spawns one external mirror-tool process per chunk and
//!   classifies its exit.
//! - [`snapshot`]: volume-snapshot provider contract with a retrying
//!   decorator for transient create failures.

pub mod copy_engine;
pub mod snapshot;

pub use copy_engine::{CopyEngine, CopyEngineError, CopyJob, JobRequest, ListEntry, ShellCopyEngine};
pub use snapshot::{RetryingSnapshot, SnapshotError, SnapshotProvider, UnsupportedSnapshot};

#[cfg(any(test, feature = "test-support"))]
pub use copy_engine::fake::{FakeCopyEngine, ScriptedOutcome};
#[cfg(any(test, feature = "test-support"))]
pub use snapshot::fake::FakeSnapshotProvider;
