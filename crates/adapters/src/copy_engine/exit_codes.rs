// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit-code classification for the mirror-tool dialect.
//!
//! The engine reports a bitmask: 1 = files copied, 2 = extra files at the
//! destination, 4 = mismatched files/dirs, 8 = some copies failed,
//! 16 = fatal error. Anything negative means the process died without an
//! exit code (killed or crashed).

use vmir_core::{ExitClass, MismatchSeverity};

const FLAG_EXTRAS: i32 = 2;
const FLAG_MISMATCH: i32 = 4;
const FLAG_FAILED: i32 = 8;
const FLAG_FATAL: i32 = 16;

/// Classified exit: severity, retryability and a human message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitClassification {
    pub class: ExitClass,
    pub should_retry: bool,
    pub message: String,
}

/// Map an engine exit code to a classification.
///
/// The `mismatch_severity` override only reinterprets the extras/mismatch
/// bits; failure bits always dominate so the override can never mask a real
/// copy failure.
pub fn classify_exit(
    exit_code: i32,
    mismatch_severity: Option<MismatchSeverity>,
) -> ExitClassification {
    if exit_code < 0 {
        return ExitClassification {
            class: ExitClass::Fatal,
            should_retry: false,
            message: "copy process terminated without an exit code".to_string(),
        };
    }

    if exit_code & FLAG_FATAL != 0 {
        return ExitClassification {
            class: ExitClass::Fatal,
            should_retry: false,
            message: format!("fatal engine error (exit {})", exit_code),
        };
    }

    if exit_code & FLAG_FAILED != 0 {
        return ExitClassification {
            class: ExitClass::Error,
            should_retry: true,
            message: format!("some files could not be copied (exit {})", exit_code),
        };
    }

    if exit_code & (FLAG_EXTRAS | FLAG_MISMATCH) != 0 {
        let (class, should_retry) = match mismatch_severity {
            Some(MismatchSeverity::Success) => (ExitClass::Success, false),
            Some(MismatchSeverity::Error) => (ExitClass::Error, false),
            Some(MismatchSeverity::Warning) | None => (ExitClass::Warning, false),
        };
        let what = if exit_code & FLAG_MISMATCH != 0 { "mismatched entries" } else { "extra files" };
        return ExitClassification {
            class,
            should_retry,
            message: format!("destination has {} (exit {})", what, exit_code),
        };
    }

    ExitClassification {
        class: ExitClass::Success,
        should_retry: false,
        message: format!("copy completed (exit {})", exit_code),
    }
}

#[cfg(test)]
#[path = "exit_codes_tests.rs"]
mod tests;
