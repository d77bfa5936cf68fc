// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunable knobs for the dispatch cycle, all defaulted per spec §4/§5.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Hop-limit policy threshold (spec §4.2.1). Default 20.
    pub max_hops: u32,
    /// Consecutive identical progress keys before non-productive
    /// repetition is suspected (spec §4.8). Default 3.
    pub repeat_threshold: u32,
    /// Skip window after a logical failure (spec §4.2). Default 2 minutes.
    pub failure_cooldown: Duration,
    /// Skip window after a run on an `open` bead (spec §4.2). Default 30s.
    pub retry_cooldown: Duration,
    /// Stale commit-lock eviction window (spec §4.9). Default 5 minutes.
    pub commit_lock_timeout: Duration,
    /// Maintenance loop period (spec §5). Default 1 minute.
    pub maintenance_interval: Duration,
    /// Reaper sweep period for `ResultHandler` (spec §4.10). Default 5 minutes.
    pub reaper_sweep_interval: Duration,
    /// Reaper entry TTL (spec §4.10). Default 1 hour.
    pub reaper_entry_ttl: Duration,
    /// Fallback dispatch loop tick period when no workflow engine drives
    /// dispatch (spec §5). Default 10 seconds.
    pub fallback_dispatch_interval: Duration,
    /// An agent is "stale" when it has missed this many heartbeat
    /// intervals (spec §5: "2x configured interval").
    pub heartbeat_stale_multiplier: u32,
    pub heartbeat_interval: Duration,
}

impl DispatchConfig {
    /// `max(maxHops*10, 200)` (spec §4.2 `hard_dispatch_limit`).
    pub fn hard_dispatch_limit(&self) -> u32 {
        (self.max_hops * 10).max(200)
    }

    /// `2x configured interval` (spec §5 stale-agent detection).
    pub fn heartbeat_stale_after(&self) -> Duration {
        self.heartbeat_interval * self.heartbeat_stale_multiplier
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_hops: 20,
            repeat_threshold: 3,
            failure_cooldown: Duration::from_secs(2 * 60),
            retry_cooldown: Duration::from_secs(30),
            commit_lock_timeout: Duration::from_secs(5 * 60),
            maintenance_interval: Duration::from_secs(60),
            reaper_sweep_interval: Duration::from_secs(5 * 60),
            reaper_entry_ttl: Duration::from_secs(60 * 60),
            fallback_dispatch_interval: Duration::from_secs(10),
            heartbeat_stale_multiplier: 2,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
