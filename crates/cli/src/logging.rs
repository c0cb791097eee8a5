// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing initialization: stderr always, rolling file log when asked.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns the appender guard that must stay
/// alive for the process lifetime when file logging is enabled.
pub fn init(verbose_file_logging: bool, state_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose_file_logging { "debug" } else { "info" }));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if verbose_file_logging {
        let appender =
            tracing_appender::rolling::daily(state_dir.join("logs"), "vmir.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer =
            tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry().with(filter).with(stderr_layer).init();
        None
    }
}
