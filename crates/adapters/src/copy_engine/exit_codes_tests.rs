// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    clean = { 0, ExitClass::Success, false },
    copied = { 1, ExitClass::Success, false },
    extras = { 2, ExitClass::Warning, false },
    mismatch = { 4, ExitClass::Warning, false },
    copied_plus_extras = { 3, ExitClass::Warning, false },
    failures = { 8, ExitClass::Error, true },
    failures_plus_copied = { 9, ExitClass::Error, true },
    fatal = { 16, ExitClass::Fatal, false },
    fatal_plus_failures = { 24, ExitClass::Fatal, false },
    killed = { -1, ExitClass::Fatal, false },
)]
fn default_classification(exit: i32, class: ExitClass, retry: bool) {
    let result = classify_exit(exit, None);
    assert_eq!(result.class, class, "exit {}", exit);
    assert_eq!(result.should_retry, retry, "exit {}", exit);
}

#[yare::parameterized(
    as_success = { MismatchSeverity::Success, ExitClass::Success },
    as_warning = { MismatchSeverity::Warning, ExitClass::Warning },
    as_error = { MismatchSeverity::Error, ExitClass::Error },
)]
fn mismatch_override_reinterprets_extras(severity: MismatchSeverity, expected: ExitClass) {
    let result = classify_exit(2, Some(severity));
    assert_eq!(result.class, expected);
    // an override never makes mismatches retryable
    assert!(!result.should_retry);
}

#[test]
fn override_cannot_mask_real_failures() {
    // exit 10 = failures (8) + extras (2): the failure bit dominates
    let result = classify_exit(10, Some(MismatchSeverity::Success));
    assert_eq!(result.class, ExitClass::Error);
    assert!(result.should_retry);

    let result = classify_exit(16 | 2, Some(MismatchSeverity::Success));
    assert_eq!(result.class, ExitClass::Fatal);
}

#[test]
fn messages_name_the_condition() {
    assert!(classify_exit(4, None).message.contains("mismatched"));
    assert!(classify_exit(2, None).message.contains("extra"));
    assert!(classify_exit(8, None).message.contains("could not be copied"));
}
