// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vmir run`: execute a replication run and drive the tick loop.

use crate::config::load_config;
use crate::exit_error::ExitError;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use vmir_adapters::{ShellCopyEngine, UnsupportedSnapshot};
use vmir_core::{format_elapsed_ms, RunPhase, SystemClock};
use vmir_engine::{Orchestrator, OrchestratorConfig};

#[derive(Args)]
pub struct RunArgs {
    /// Path to the TOML run configuration
    #[arg(long, short = 'c')]
    pub config: PathBuf,
    /// Override the configured worker-pool size
    #[arg(long)]
    pub jobs: Option<u32>,
    /// List-only pass: plan and launch jobs without copying
    #[arg(long)]
    pub dry_run: bool,
    /// Start fresh even when a checkpoint exists
    #[arg(long)]
    pub ignore_checkpoint: bool,
    /// Verbose engine logs plus a rolling file log under the state dir
    #[arg(long, short = 'v')]
    pub verbose: bool,
    /// Milliseconds between scheduler ticks
    #[arg(long, default_value_t = 500)]
    pub tick_ms: u64,
}

pub async fn execute(args: RunArgs) -> Result<(), ExitError> {
    let loaded = load_config(&args.config)?;

    let mut settings = loaded.settings;
    if let Some(jobs) = args.jobs {
        settings.max_concurrent_jobs = jobs;
    }
    settings.dry_run = args.dry_run;
    settings.ignore_checkpoint = args.ignore_checkpoint;
    settings.verbose_logging = args.verbose;
    let settings = settings.normalize();

    let _log_guard = crate::logging::init(args.verbose, &loaded.state_dir);

    let engine = ShellCopyEngine::new(&loaded.copy_engine);
    let config = OrchestratorConfig {
        state_dir: loaded.state_dir.clone(),
        ..OrchestratorConfig::default()
    };

    let orchestrator =
        Orchestrator::start(settings, engine, UnsupportedSnapshot, SystemClock, config)
            .await
            .map_err(|e| ExitError::new(1, format!("run could not start: {}", e)))?;

    // Ctrl-C raises a cooperative stop; the next tick terminates jobs.
    let state = orchestrator.state();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping");
            state.request_stop();
        }
    });

    let interval = Duration::from_millis(args.tick_ms.max(50));
    let mut last_line = String::new();
    while !orchestrator.is_terminal() {
        orchestrator.tick().await;
        let status = orchestrator.status();
        let line = format!(
            "[{}] {} {:>5.1}% ({}/{} chunks, {} failed) elapsed {}{}",
            status.phase,
            status.current_profile.as_deref().unwrap_or("-"),
            status.profile_progress,
            status.chunks_complete,
            status.chunks_total,
            status.chunks_failed,
            format_elapsed_ms(status.elapsed_ms),
            status
                .eta_ms
                .map(|eta| format!(", eta {}", format_elapsed_ms(eta)))
                .unwrap_or_default(),
        );
        if line != last_line {
            println!("{}", line);
            last_line = line;
        }
        for message in orchestrator.state().drain_errors() {
            eprintln!("error: {}", message);
        }
        tokio::time::sleep(interval).await;
    }

    let state = orchestrator.state();
    for result in state.profile_results_snapshot() {
        println!(
            "profile '{}': {} ({} complete, {} failed, {} skipped, {} bytes, {})",
            result.profile,
            result.status,
            result.chunks_complete,
            result.chunks_failed,
            result.chunks_skipped,
            result.bytes_complete,
            format_elapsed_ms(result.elapsed_ms),
        );
    }

    match state.phase() {
        RunPhase::Complete => Ok(()),
        phase => Err(ExitError::new(1, format!("run ended in phase '{}'", phase))),
    }
}
