// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run configuration loading.
//!
//! The engine crates never read config files; everything arrives here as a
//! TOML document and leaves as a validated `RunSettings`.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use vmir_core::{Profile, RunSettings};

/// `[run]` section: run-level knobs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub max_concurrent_jobs: Option<u32>,
    pub bandwidth_limit_mbps: Option<u32>,
    pub state_dir: Option<PathBuf>,
    /// Copy-engine binary; defaults to `robocopy` on PATH.
    pub copy_engine: Option<PathBuf>,
}

/// Whole config file: a `[run]` table plus `[[profile]]` entries.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub run: RunSection,
    #[serde(default, rename = "profile")]
    pub profiles: Vec<Profile>,
}

/// Validated configuration ready to hand to the orchestrator.
#[derive(Debug)]
pub struct LoadedConfig {
    pub settings: RunSettings,
    pub state_dir: PathBuf,
    pub copy_engine: PathBuf,
}

pub fn load_config(path: &Path) -> anyhow::Result<LoadedConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let file: ConfigFile =
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    validate_profiles(&file.profiles)?;

    let defaults = RunSettings::default();
    let settings = RunSettings {
        profiles: file.profiles,
        max_concurrent_jobs: file
            .run
            .max_concurrent_jobs
            .unwrap_or(defaults.max_concurrent_jobs),
        bandwidth_limit_mbps: file
            .run
            .bandwidth_limit_mbps
            .unwrap_or(defaults.bandwidth_limit_mbps),
        ..defaults
    }
    .normalize();

    Ok(LoadedConfig {
        settings,
        state_dir: file.run.state_dir.unwrap_or_else(vmir_storage::default_state_dir),
        copy_engine: file.run.copy_engine.unwrap_or_else(|| PathBuf::from("robocopy")),
    })
}

fn validate_profiles(profiles: &[Profile]) -> anyhow::Result<()> {
    if profiles.is_empty() {
        bail!("config has no [[profile]] entries");
    }
    let mut names = HashSet::new();
    for profile in profiles {
        if profile.name.trim().is_empty() {
            bail!("profile with empty name");
        }
        if !names.insert(profile.name.to_lowercase()) {
            bail!("duplicate profile name '{}'", profile.name);
        }
        if profile.source.as_os_str().is_empty() {
            bail!("profile '{}' has an empty source", profile.name);
        }
        if profile.destination.as_os_str().is_empty() {
            bail!("profile '{}' has an empty destination", profile.name);
        }
        if profile.source == profile.destination {
            bail!("profile '{}' copies onto itself", profile.name);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
