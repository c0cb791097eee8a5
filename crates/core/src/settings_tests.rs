// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero_becomes_one = { 0, 1 },
    one_stays = { 1, 1 },
    mid_stays = { 64, 64 },
    cap_stays = { 128, 128 },
    over_cap_clamped = { 500, 128 },
)]
fn normalize_clamps_concurrency(input: u32, expected: u32) {
    let settings = RunSettings { max_concurrent_jobs: input, ..RunSettings::default() };
    assert_eq!(settings.normalize().max_concurrent_jobs, expected);
}

#[test]
fn defaults() {
    let settings = RunSettings::default();
    assert_eq!(settings.max_concurrent_jobs, 4);
    assert_eq!(settings.bandwidth_limit_mbps, 0);
    assert!(!settings.dry_run);
    assert!(!settings.ignore_checkpoint);
}
