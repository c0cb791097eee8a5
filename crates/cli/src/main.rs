// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vmir: replicate directory trees through a pool of external copy jobs.

mod commands;
mod config;
mod exit_error;
mod logging;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vmir", version, about = "Chunked directory-tree replication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a replication run from a TOML configuration
    Run(commands::run::RunArgs),
    /// Plan a run's chunks without copying anything
    Plan(commands::plan::PlanArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(e.code);
    }
}
