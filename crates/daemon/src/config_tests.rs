// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_config_has_one_unscoped_project() {
    let cfg = Config::default();
    assert_eq!(cfg.projects, vec![String::new()]);
    assert_eq!(cfg.log.filter, "info");
}

#[test]
fn missing_path_falls_back_to_defaults() {
    let cfg = Config::load(Some(Path::new("/nonexistent/ralphd.toml"))).unwrap();
    assert_eq!(cfg.dispatch.max_hops, 20);
}

#[test]
fn none_path_and_no_env_falls_back_to_defaults() {
    std::env::remove_var("RALPHD_CONFIG");
    let cfg = Config::load(None).unwrap();
    assert_eq!(cfg.projects, vec![String::new()]);
}

#[test]
fn parses_overrides_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ralphd.toml");
    std::fs::write(
        &path,
        r#"
        projects = ["alpha", "beta"]

        [log]
        filter = "debug"

        [dispatch]
        max_hops = 5
        fallback_dispatch_interval_secs = 1
        "#,
    )
    .unwrap();

    let cfg = Config::load(Some(&path)).unwrap();
    assert_eq!(cfg.projects, vec!["alpha".to_string(), "beta".to_string()]);
    assert_eq!(cfg.log.filter, "debug");
    assert_eq!(cfg.dispatch.max_hops, 5);
    assert_eq!(cfg.dispatch.fallback_dispatch_interval_secs, 1);
    // Unspecified dispatch fields still take their defaults.
    assert_eq!(cfg.dispatch.repeat_threshold, 3);
}

#[test]
fn dispatch_section_maps_seconds_to_durations() {
    let section = DispatchSection { commit_lock_timeout_secs: 42, ..DispatchSection::default() };
    let dispatch: DispatchConfig = section.into();
    assert_eq!(dispatch.commit_lock_timeout, Duration::from_secs(42));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ralphd.toml");
    std::fs::write(&path, "not valid toml [[[").unwrap();
    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, DaemonError::ConfigParse { .. }));
}
