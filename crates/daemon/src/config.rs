// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: which projects the fallback dispatch loop
//! drives, and the dispatch-core tunables from spec §4/§5, loaded from a
//! TOML file with every field defaulted so an empty or absent file is a
//! valid configuration.

use crate::error::{DaemonError, DaemonResult};
use ralph_dispatch::DispatchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration loaded from `ralphd.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Projects the fallback dispatch loop cycles through. Empty means
    /// "dispatch against the unscoped project" (`""`), matching a
    /// single-tenant deployment.
    #[serde(default = "default_projects")]
    pub projects: Vec<String>,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub dispatch: DispatchSection,
}

fn default_projects() -> Vec<String> {
    vec![String::new()]
}

impl Default for Config {
    fn default() -> Self {
        Self { projects: default_projects(), log: LogConfig::default(), dispatch: DispatchSection::default() }
    }
}

impl Config {
    /// Load from `path` if given, else from `RALPHD_CONFIG`, else fall
    /// back to defaults without requiring a file to exist at all.
    pub fn load(path: Option<&Path>) -> DaemonResult<Self> {
        let resolved = path.map(PathBuf::from).or_else(|| std::env::var("RALPHD_CONFIG").ok().map(PathBuf::from));
        let Some(path) = resolved else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| DaemonError::ConfigRead { path: path.clone(), source })?;
        toml::from_str(&text).map_err(|source| DaemonError::ConfigParse { path, source })
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        self.dispatch.clone().into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

/// Mirrors [`DispatchConfig`] field-for-field so it round-trips through
/// TOML; durations are expressed in seconds on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSection {
    #[serde(default = "defaults::max_hops")]
    pub max_hops: u32,
    #[serde(default = "defaults::repeat_threshold")]
    pub repeat_threshold: u32,
    #[serde(default = "defaults::failure_cooldown_secs")]
    pub failure_cooldown_secs: u64,
    #[serde(default = "defaults::retry_cooldown_secs")]
    pub retry_cooldown_secs: u64,
    #[serde(default = "defaults::commit_lock_timeout_secs")]
    pub commit_lock_timeout_secs: u64,
    #[serde(default = "defaults::maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
    #[serde(default = "defaults::reaper_sweep_interval_secs")]
    pub reaper_sweep_interval_secs: u64,
    #[serde(default = "defaults::reaper_entry_ttl_secs")]
    pub reaper_entry_ttl_secs: u64,
    #[serde(default = "defaults::fallback_dispatch_interval_secs")]
    pub fallback_dispatch_interval_secs: u64,
    #[serde(default = "defaults::heartbeat_stale_multiplier")]
    pub heartbeat_stale_multiplier: u32,
    #[serde(default = "defaults::heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

mod defaults {
    pub fn max_hops() -> u32 {
        20
    }
    pub fn repeat_threshold() -> u32 {
        3
    }
    pub fn failure_cooldown_secs() -> u64 {
        120
    }
    pub fn retry_cooldown_secs() -> u64 {
        30
    }
    pub fn commit_lock_timeout_secs() -> u64 {
        300
    }
    pub fn maintenance_interval_secs() -> u64 {
        60
    }
    pub fn reaper_sweep_interval_secs() -> u64 {
        300
    }
    pub fn reaper_entry_ttl_secs() -> u64 {
        3600
    }
    pub fn fallback_dispatch_interval_secs() -> u64 {
        10
    }
    pub fn heartbeat_stale_multiplier() -> u32 {
        2
    }
    pub fn heartbeat_interval_secs() -> u64 {
        30
    }
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            max_hops: defaults::max_hops(),
            repeat_threshold: defaults::repeat_threshold(),
            failure_cooldown_secs: defaults::failure_cooldown_secs(),
            retry_cooldown_secs: defaults::retry_cooldown_secs(),
            commit_lock_timeout_secs: defaults::commit_lock_timeout_secs(),
            maintenance_interval_secs: defaults::maintenance_interval_secs(),
            reaper_sweep_interval_secs: defaults::reaper_sweep_interval_secs(),
            reaper_entry_ttl_secs: defaults::reaper_entry_ttl_secs(),
            fallback_dispatch_interval_secs: defaults::fallback_dispatch_interval_secs(),
            heartbeat_stale_multiplier: defaults::heartbeat_stale_multiplier(),
            heartbeat_interval_secs: defaults::heartbeat_interval_secs(),
        }
    }
}

impl From<DispatchSection> for DispatchConfig {
    fn from(section: DispatchSection) -> Self {
        DispatchConfig {
            max_hops: section.max_hops,
            repeat_threshold: section.repeat_threshold,
            failure_cooldown: Duration::from_secs(section.failure_cooldown_secs),
            retry_cooldown: Duration::from_secs(section.retry_cooldown_secs),
            commit_lock_timeout: Duration::from_secs(section.commit_lock_timeout_secs),
            maintenance_interval: Duration::from_secs(section.maintenance_interval_secs),
            reaper_sweep_interval: Duration::from_secs(section.reaper_sweep_interval_secs),
            reaper_entry_ttl: Duration::from_secs(section.reaper_entry_ttl_secs),
            fallback_dispatch_interval: Duration::from_secs(section.fallback_dispatch_interval_secs),
            heartbeat_stale_multiplier: section.heartbeat_stale_multiplier,
            heartbeat_interval: Duration::from_secs(section.heartbeat_interval_secs),
        }
    }
}

/// Resolve the daemon's state directory: `RALPH_STATE_DIR` >
/// `XDG_STATE_HOME/ralph` > `~/.local/state/ralph`. Unused until a real
/// persistence backend replaces the in-memory stores, but kept here so
/// that backend has a place to read from on day one.
pub fn state_dir() -> DaemonResult<PathBuf> {
    if let Ok(dir) = std::env::var("RALPH_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ralph"));
    }
    let home = std::env::var("HOME").map_err(|_| DaemonError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ralph"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
