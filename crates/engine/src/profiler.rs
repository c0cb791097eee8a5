// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory profiler: subtree totals from the copy engine's list-only mode.
//!
//! Profiling and copying share one enumeration, so the planner's estimates
//! match what the engine will actually see. Results are cached process-wide
//! with a TTL; the cache is cleared at the start of every run.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vmir_adapters::{CopyEngine, CopyEngineError, ListEntry};
use vmir_core::CopyOptions;

/// Aggregated listing of one directory subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirProfile {
    pub root: PathBuf,
    pub total_bytes: u64,
    pub file_count: u64,
    pub dir_count: u64,
    /// Entries with paths relative to `root`.
    pub entries: Vec<ListEntry>,
    pub last_scanned_ms: u64,
}

/// Process-wide cache of directory profiles.
///
/// Keys are case-insensitive path strings. When full, the oldest tenth of
/// entries (by scan time) is evicted.
pub struct ProfileCache {
    entries: Mutex<HashMap<String, DirProfile>>,
    ttl_ms: u64,
    capacity: usize,
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::with_config(Self::DEFAULT_TTL_MS, Self::DEFAULT_CAPACITY)
    }
}

impl ProfileCache {
    pub const DEFAULT_TTL_MS: u64 = 24 * 60 * 60 * 1000;
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(ttl_ms: u64, capacity: usize) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl_ms, capacity: capacity.max(1) }
    }

    fn key(path: &Path) -> String {
        path.display().to_string().to_lowercase()
    }

    pub fn get(&self, path: &Path, now_ms: u64) -> Option<DirProfile> {
        let entries = self.entries.lock();
        let profile = entries.get(&Self::key(path))?;
        if now_ms.saturating_sub(profile.last_scanned_ms) > self.ttl_ms {
            return None;
        }
        Some(profile.clone())
    }

    pub fn insert(&self, profile: DirProfile) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&Self::key(&profile.root)) {
            // Evict the oldest 10% by scan time.
            let evict = (self.capacity / 10).max(1);
            let mut by_age: Vec<(String, u64)> =
                entries.iter().map(|(k, v)| (k.clone(), v.last_scanned_ms)).collect();
            by_age.sort_by_key(|(_, scanned)| *scanned);
            for (key, _) in by_age.into_iter().take(evict) {
                entries.remove(&key);
            }
        }
        entries.insert(Self::key(&profile.root), profile);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Profiler over any [`CopyEngine`], sharing one [`ProfileCache`].
#[derive(Clone)]
pub struct DirectoryProfiler {
    cache: Arc<ProfileCache>,
}

impl DirectoryProfiler {
    pub fn new(cache: Arc<ProfileCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    /// Profile a subtree, consulting the cache first.
    pub async fn profile<E: CopyEngine + ?Sized>(
        &self,
        engine: &E,
        root: &Path,
        options: &CopyOptions,
        now_ms: u64,
    ) -> Result<DirProfile, CopyEngineError> {
        if let Some(cached) = self.cache.get(root, now_ms) {
            return Ok(cached);
        }

        let raw = engine.list(root, options).await?;
        let entries = normalize_entries(root, raw);

        let mut total_bytes = 0u64;
        let mut file_count = 0u64;
        let mut dir_count = 0u64;
        for entry in &entries {
            if entry.is_dir {
                dir_count += 1;
            } else {
                file_count += 1;
                total_bytes = total_bytes.saturating_add(entry.size);
            }
        }

        let profile = DirProfile {
            root: root.to_path_buf(),
            total_bytes,
            file_count,
            dir_count,
            entries,
            last_scanned_ms: now_ms,
        };
        tracing::debug!(
            root = %root.display(),
            bytes = total_bytes,
            files = file_count,
            dirs = dir_count,
            "profiled directory"
        );
        self.cache.insert(profile.clone());
        Ok(profile)
    }
}

/// Engines may print absolute or root-relative paths; store them relative.
fn normalize_entries(root: &Path, raw: Vec<ListEntry>) -> Vec<ListEntry> {
    raw.into_iter()
        .filter_map(|entry| {
            let ListEntry { size, path, is_dir } = entry;
            let rel = match path.strip_prefix(root) {
                Ok(rest) if rest.as_os_str().is_empty() => return None, // the root itself
                Ok(rest) => rest.to_path_buf(),
                Err(_) => path,
            };
            Some(ListEntry { size, path: rel, is_dir })
        })
        .collect()
}

#[cfg(test)]
#[path = "profiler_tests.rs"]
mod tests;
