// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vmir plan`: print the chunk plan for every profile without copying.
//!
//! Uses the same profiler and planner as a real run, so the printed set is
//! exactly what `vmir run` would execute (deterministic replay).

use crate::config::load_config;
use crate::exit_error::ExitError;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use vmir_adapters::ShellCopyEngine;
use vmir_core::{Clock, SystemClock};
use vmir_engine::{plan_chunks, ChunkIdGen, DirectoryProfiler, ProfileCache};

#[derive(Args)]
pub struct PlanArgs {
    /// Path to the TOML run configuration
    #[arg(long, short = 'c')]
    pub config: PathBuf,
}

pub async fn execute(args: PlanArgs) -> Result<(), ExitError> {
    let loaded = load_config(&args.config)?;
    let _log_guard = crate::logging::init(false, &loaded.state_dir);

    let engine = ShellCopyEngine::new(&loaded.copy_engine);
    let profiler = DirectoryProfiler::new(Arc::new(ProfileCache::new()));
    let clock = SystemClock;
    let mut ids = ChunkIdGen::new();

    for profile in &loaded.settings.profiles {
        let dir_profile = profiler
            .profile(&engine, &profile.source, &profile.copy, clock.epoch_ms())
            .await
            .map_err(|e| {
                ExitError::new(1, format!("profile '{}': scan failed: {}", profile.name, e))
            })?;

        let chunks = plan_chunks(
            &dir_profile.entries,
            &profile.source,
            &profile.destination,
            &profile.limits,
            profile.scan_mode,
            &mut ids,
        );

        println!(
            "profile '{}' ({}): {} chunks over {} files, {} bytes",
            profile.name,
            profile.scan_mode,
            chunks.len(),
            dir_profile.file_count,
            dir_profile.total_bytes,
        );
        for chunk in &chunks {
            println!(
                "  #{:<4} {:>14} bytes {:>8} files  depth {}  {}  {}",
                chunk.id,
                chunk.estimated_bytes,
                chunk.estimated_files,
                chunk.depth,
                if chunk.recursive { "tree " } else { "files" },
                chunk.source.display(),
            );
        }
    }

    Ok(())
}
