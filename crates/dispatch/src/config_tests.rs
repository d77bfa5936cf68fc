// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn hard_dispatch_limit_uses_the_larger_of_the_two_floors() {
    let config = DispatchConfig::default();
    assert_eq!(config.hard_dispatch_limit(), 200);

    let config = DispatchConfig { max_hops: 30, ..DispatchConfig::default() };
    assert_eq!(config.hard_dispatch_limit(), 300);
}

#[test]
fn heartbeat_stale_after_is_double_the_interval_by_default() {
    let config = DispatchConfig::default();
    assert_eq!(config.heartbeat_stale_after(), config.heartbeat_interval * 2);
}

#[test]
fn defaults_match_spec() {
    let config = DispatchConfig::default();
    assert_eq!(config.max_hops, 20);
    assert_eq!(config.repeat_threshold, 3);
    assert_eq!(config.failure_cooldown.as_secs(), 120);
    assert_eq!(config.retry_cooldown.as_secs(), 30);
    assert_eq!(config.commit_lock_timeout.as_secs(), 300);
    assert_eq!(config.maintenance_interval.as_secs(), 60);
    assert_eq!(config.reaper_sweep_interval.as_secs(), 300);
    assert_eq!(config.reaper_entry_ttl.as_secs(), 3600);
    assert_eq!(config.fallback_dispatch_interval.as_secs(), 10);
}
