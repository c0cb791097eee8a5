// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-chunk retry policy with exponential backoff.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many times a retryable chunk failure is re-attempted and how long the
/// scheduler waits between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base: Duration::from_secs(5),
            multiplier: 2,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `retry_count` (1-based):
    /// `min(base · multiplier^(retry_count − 1), max_delay)`.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.saturating_sub(1).min(16);
        let factor = (self.multiplier as u64).saturating_pow(exponent);
        let delay = self.base.saturating_mul(factor.min(u32::MAX as u64) as u32);
        delay.min(self.max_delay)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
