// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented parsers for the mirror-tool log format.
//!
//! Three consumers: the completion path reads the summary table, the
//! progress sampler tails the live log, and the directory profiler reads
//! list-only output.

use super::ListEntry;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use vmir_core::JobStats;

// "   Files :      109        63        46 ..." — second column is copied
#[allow(clippy::expect_used)]
static FILES_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Files\s*:\s*(\d+)\s+(\d+)").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static BYTES_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Bytes\s*:\s*(\d+)\s+(\d+)").expect("constant regex pattern is valid")
});

// "  New File        123456  <path>" (also Newer/Modified for changed files)
#[allow(clippy::expect_used)]
static TRANSFER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:New File|Newer|Modified)\s+(\d+)\s")
        .expect("constant regex pattern is valid")
});

/// Totals and error lines from a finished job's log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub stats: JobStats,
    pub errors: Vec<String>,
}

/// Parse the summary table at the end of a job log.
pub fn parse_summary(log: &str) -> LogSummary {
    let mut summary = LogSummary::default();

    if let Some(caps) = FILES_ROW.captures(log) {
        summary.stats.files_copied =
            caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    }
    if let Some(caps) = BYTES_ROW.captures(log) {
        summary.stats.bytes_copied =
            caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    }

    for line in log.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("ERROR :") {
            summary.errors.push(rest.trim().to_string());
        } else if trimmed.contains("ERROR ") {
            summary.errors.push(trimmed.to_string());
        }
    }

    summary
}

/// Running bytes-so-far from an in-progress log: the sum of per-file sizes
/// on transfer lines written so far. None when nothing has been logged yet.
pub fn parse_progress_bytes(log: &str) -> Option<u64> {
    let mut total: u64 = 0;
    let mut seen = false;
    for caps in TRANSFER_LINE.captures_iter(log) {
        if let Some(size) = caps.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) {
            total = total.saturating_add(size);
            seen = true;
        }
    }
    seen.then_some(total)
}

/// Parse list-only output: one `<size> <path>` per line, directories ending
/// with a path separator. Malformed lines are skipped.
pub fn parse_listing(output: &str) -> Vec<ListEntry> {
    let mut entries = Vec::new();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((size_str, path_str)) = trimmed.split_once(char::is_whitespace) else {
            continue;
        };
        let Ok(size) = size_str.parse::<u64>() else {
            continue;
        };
        let path_str = path_str.trim_start();
        if path_str.is_empty() {
            continue;
        }
        let is_dir = path_str.ends_with('/') || path_str.ends_with('\\');
        let path = PathBuf::from(path_str.trim_end_matches(['/', '\\']));
        entries.push(ListEntry { size, path, is_dir });
    }
    entries
}

#[cfg(test)]
#[path = "log_parse_tests.rs"]
mod tests;
