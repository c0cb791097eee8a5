// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn zero_cap_disables_pacing() {
    let governor = BandwidthGovernor::new(0);
    assert_eq!(governor.pacing_gap_ms(0), None);
    assert_eq!(governor.pacing_gap_ms(10), None);
}

#[test]
fn first_job_gets_the_whole_cap() {
    // 100 Mbps, 64 KiB blocks: 524288 bits / 100e6 bps ≈ 5.24 ms per block
    let governor = BandwidthGovernor::new(100);
    assert_eq!(governor.pacing_gap_ms(0), Some(5));
}

#[test]
fn later_jobs_get_a_smaller_share() {
    let governor = BandwidthGovernor::new(100);
    let alone = governor.pacing_gap_ms(0).unwrap();
    let with_one = governor.pacing_gap_ms(1).unwrap();
    let with_three = governor.pacing_gap_ms(3).unwrap();

    // smaller share means a longer gap between blocks
    assert!(with_one > alone);
    assert!(with_three > with_one);
    // share halves → gap doubles
    assert_eq!(with_one, alone * 2);
}

#[test]
fn gap_never_rounds_to_zero() {
    // Huge cap: the gap still floors at 1 ms rather than disappearing.
    let governor = BandwidthGovernor::new(10_000);
    assert_eq!(governor.pacing_gap_ms(0), Some(1));
}
