// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[yare::parameterized(
    pending = { ChunkStatus::Pending, false },
    running = { ChunkStatus::Running, false },
    complete_ok = { ChunkStatus::CompleteOk, true },
    complete_warn = { ChunkStatus::CompleteWithWarnings, true },
    failed = { ChunkStatus::Failed, true },
    skipped = { ChunkStatus::Skipped, true },
)]
fn terminal_states(status: ChunkStatus, terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[yare::parameterized(
    complete_ok = { ChunkStatus::CompleteOk, true },
    complete_warn = { ChunkStatus::CompleteWithWarnings, true },
    failed = { ChunkStatus::Failed, false },
    skipped = { ChunkStatus::Skipped, false },
)]
fn complete_states(status: ChunkStatus, complete: bool) {
    assert_eq!(status.is_complete(), complete);
}

#[test]
fn status_display() {
    assert_eq!(ChunkStatus::CompleteWithWarnings.to_string(), "complete-with-warnings");
    assert_eq!(ChunkStatus::Pending.to_string(), "pending");
}

#[test]
fn limits_fits_requires_both_budgets() {
    let limits = ChunkLimits { max_bytes: 100, max_files: 10, max_depth: 2 };
    assert!(limits.fits(100, 10));
    assert!(!limits.fits(101, 1));
    assert!(!limits.fits(1, 11));
}

#[test]
fn new_chunk_starts_pending() {
    let chunk = Chunk::new(ChunkId(5), "/s", "/d", 42, 3, 1, true);
    assert_eq!(chunk.status, ChunkStatus::Pending);
    assert_eq!(chunk.retry_count, 0);
    assert!(chunk.retry_after_ms.is_none());
    assert!(chunk.ready_at(0));
}

#[test]
fn first_failure_sets_backoff_deadline() {
    let policy = RetryPolicy::default();
    let mut chunk = Chunk::builder().build();
    chunk.status = ChunkStatus::Running;

    assert!(chunk.register_failure(&policy, 10_000, "copy engine exit 8"));

    assert_eq!(chunk.retry_count, 1);
    assert_eq!(chunk.status, ChunkStatus::Pending);
    // first backoff is the base delay (5s)
    assert_eq!(chunk.retry_after_ms, Some(10_000 + 5_000));
    assert!(!chunk.ready_at(14_999));
    assert!(chunk.ready_at(15_000));
    assert_eq!(chunk.last_error.as_deref(), Some("copy engine exit 8"));
}

#[test]
fn retry_deadlines_grow_exponentially() {
    let policy = RetryPolicy { max_retries: 5, ..RetryPolicy::default() };
    let mut chunk = Chunk::builder().build();

    assert!(chunk.register_failure(&policy, 0, "e1"));
    assert_eq!(chunk.retry_after_ms, Some(5_000));
    assert!(chunk.register_failure(&policy, 0, "e2"));
    assert_eq!(chunk.retry_after_ms, Some(10_000));
    assert!(chunk.register_failure(&policy, 0, "e3"));
    assert_eq!(chunk.retry_after_ms, Some(20_000));
}

#[test]
fn third_failure_is_terminal_under_default_policy() {
    // retry counts observed across consecutive failures: 1, 2, then 3 = terminal
    let policy = RetryPolicy { max_retries: 3, base: Duration::from_secs(1), ..RetryPolicy::default() };
    let mut chunk = Chunk::builder().build();
    assert!(chunk.register_failure(&policy, 0, "boom"));
    assert_eq!(chunk.retry_count, 1);
    assert!(chunk.register_failure(&policy, 0, "boom"));
    assert_eq!(chunk.retry_count, 2);
    assert!(!chunk.register_failure(&policy, 0, "boom"));
    assert_eq!(chunk.retry_count, 3);
}
