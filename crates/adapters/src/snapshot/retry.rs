// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry decorator for transient snapshot-create failures.

use super::{SnapshotError, SnapshotProvider};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vmir_core::SnapshotInfo;

/// Message fragments that mark a create failure as worth retrying.
///
/// Providers surface locale-formatted strings, so matching is lowercase
/// substring. TODO: replace with structured error codes once the provider
/// contract grows them.
const TRANSIENT_PATTERNS: &[&str] = &[
    "busy",
    "timeout",
    "timed out",
    "lock",
    "in use",
    "insufficient storage",
    "service not running",
    "try again",
];

/// Whether a create failure message looks transient.
pub fn is_transient_error(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TRANSIENT_PATTERNS.iter().any(|p| lowered.contains(p))
}

/// Wraps a provider with the create-retry contract: up to `attempts` tries
/// with a fixed delay between them, retrying only transient failures.
pub struct RetryingSnapshot<P> {
    inner: P,
    attempts: u32,
    delay: Duration,
}

impl<P> RetryingSnapshot<P> {
    pub fn new(inner: P) -> Self {
        Self { inner, attempts: 3, delay: Duration::from_secs(5) }
    }

    pub fn with_schedule(inner: P, attempts: u32, delay: Duration) -> Self {
        Self { inner, attempts: attempts.max(1), delay }
    }
}

#[async_trait]
impl<P: SnapshotProvider> SnapshotProvider for RetryingSnapshot<P> {
    fn is_supported(&self, path: &Path) -> bool {
        self.inner.is_supported(path)
    }

    async fn preflight(&self) -> Result<(), SnapshotError> {
        self.inner.preflight().await
    }

    async fn create(&self, source: &Path) -> Result<SnapshotInfo, SnapshotError> {
        let mut attempt = 1;
        loop {
            match self.inner.create(source).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if attempt < self.attempts && is_transient_error(&e.to_string()) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        source = %source.display(),
                        "transient snapshot create failure, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn translate(&self, original: &Path, snapshot: &SnapshotInfo) -> PathBuf {
        self.inner.translate(original, snapshot)
    }

    async fn remove(&self, shadow_id: &str) -> Result<(), SnapshotError> {
        self.inner.remove(shadow_id).await
    }

    async fn enumerate(&self) -> Result<Vec<SnapshotInfo>, SnapshotError> {
        self.inner.enumerate().await
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
