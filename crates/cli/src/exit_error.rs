// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command failure carrying the process exit code.
//!
//! `main()` is the only place that terminates the process; commands bubble
//! an `ExitError` up to it. Exit 1 is a failed run, exit 2 a configuration
//! or startup problem.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Configuration or startup problem (exit 2).
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }
}

impl From<anyhow::Error> for ExitError {
    fn from(e: anyhow::Error) -> Self {
        // `:#` keeps the context chain on one line
        Self::config(format!("{:#}", e))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
