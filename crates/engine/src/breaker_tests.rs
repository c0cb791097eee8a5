// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn trips_at_threshold() {
    let mut breaker = CircuitBreaker::new(3);
    assert!(!breaker.record_failure("chunk 1"));
    assert!(!breaker.record_failure("chunk 2"));
    assert!(breaker.record_failure("chunk 3"));
    assert!(breaker.is_tripped());
    assert!(breaker.reason().unwrap().contains("3 consecutive"));
    assert!(breaker.reason().unwrap().contains("chunk 3"));
}

#[test]
fn trip_fires_exactly_once() {
    let mut breaker = CircuitBreaker::new(2);
    assert!(!breaker.record_failure("a"));
    assert!(breaker.record_failure("b"));
    assert!(!breaker.record_failure("c"));
    assert!(breaker.is_tripped());
}

#[test]
fn success_resets_the_count() {
    let mut breaker = CircuitBreaker::new(3);
    breaker.record_failure("a");
    breaker.record_failure("b");
    breaker.record_success();
    assert_eq!(breaker.consecutive_failures(), 0);
    assert!(!breaker.record_failure("c"));
    assert!(!breaker.is_tripped());
}

#[test]
fn success_does_not_clear_a_trip() {
    let mut breaker = CircuitBreaker::new(1);
    breaker.record_failure("a");
    assert!(breaker.is_tripped());
    breaker.record_success();
    assert!(breaker.is_tripped());
}

#[test]
fn reset_clears_everything() {
    let mut breaker = CircuitBreaker::new(1);
    breaker.record_failure("a");
    breaker.reset();
    assert!(!breaker.is_tripped());
    assert_eq!(breaker.consecutive_failures(), 0);
    assert!(breaker.reason().is_none());
}

#[test]
fn zero_threshold_is_clamped_to_one() {
    let mut breaker = CircuitBreaker::new(0);
    assert!(breaker.record_failure("a"));
}

#[test]
fn default_threshold_is_ten() {
    let mut breaker = CircuitBreaker::default();
    for i in 0..9 {
        assert!(!breaker.record_failure(&format!("chunk {}", i)));
    }
    assert!(breaker.record_failure("chunk 9"));
}
