// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

const TEN_MINUTES_MS: u64 = 10 * 60 * 1000;

#[test]
fn read_only_actions_never_refresh_last_progress() {
    let mut ctx = Context::new();
    for i in 0..7 {
        record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "test.go".to_string(), at_ms: i * 1000 });
    }
    let metrics = get_progress_metrics(&ctx);
    assert_eq!(metrics.last_progress_ms, None);
    assert_eq!(metrics.consecutive_repeats, 7);
}

#[test]
fn mutating_action_refreshes_last_progress_and_resets_repeat_count_on_new_key() {
    let mut ctx = Context::new();
    record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "a.go".to_string(), at_ms: 0 });
    record_action(&mut ctx, ActionRecord { action_type: ActionType::EditFile, target: "a.go".to_string(), at_ms: 1000 });
    let metrics = get_progress_metrics(&ctx);
    assert_eq!(metrics.last_progress_ms, Some(1000));
    assert_eq!(metrics.consecutive_repeats, 1);
}

#[test]
fn stuck_exploration_scenario_matches_spec_example_6() {
    let mut ctx = Context::new();
    for i in 0..7 {
        record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "test.go".to_string(), at_ms: i * 1000 });
    }
    // last_progress_ms is None (never set by read-only actions); "10 minutes ago"
    // with no progress at all is at least as stale as 10 minutes.
    let now_ms = TEN_MINUTES_MS + 7000;
    let reason = is_stuck_in_loop(&ctx, 1, 3, now_ms);
    assert_eq!(reason, Some(StuckReason::NonProductiveRepetition));
    assert!(reason.unwrap().message().contains("Repeated action pattern"));
}

#[test]
fn repetition_below_threshold_is_not_stuck() {
    let mut ctx = Context::new();
    record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "a.go".to_string(), at_ms: 0 });
    record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "a.go".to_string(), at_ms: 1000 });
    assert_eq!(is_stuck_in_loop(&ctx, 1, 3, TEN_MINUTES_MS), None);
}

#[test]
fn recent_progress_prevents_non_productive_stuck_verdict() {
    let mut ctx = Context::new();
    for i in 0..5 {
        record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "a.go".to_string(), at_ms: i * 1000 });
    }
    // Refresh progress right before the check.
    record_action(&mut ctx, ActionRecord { action_type: ActionType::EditFile, target: "b.go".to_string(), at_ms: 5000 });
    assert_eq!(is_stuck_in_loop(&ctx, 1, 3, 6000), None);
}

#[test]
fn three_auth_errors_in_last_ten_trigger_stuck_after_five_dispatches() {
    let mut ctx = Context::new();
    record_error(&mut ctx, "status code 401", 0);
    record_error(&mut ctx, "status code 403", 1000);
    record_error(&mut ctx, "No api key configured", 2000);
    assert_eq!(is_stuck_in_loop(&ctx, 5, 3, 3000), Some(StuckReason::RepeatedAuthErrors));
}

#[test]
fn auth_errors_do_not_trigger_before_five_dispatches() {
    let mut ctx = Context::new();
    for i in 0..3 {
        record_error(&mut ctx, "status code 401", i * 1000);
    }
    assert_eq!(is_stuck_in_loop(&ctx, 4, 3, 3000), None);
}

#[test]
fn five_identical_consecutive_errors_trigger_stuck() {
    let mut ctx = Context::new();
    for i in 0..5 {
        record_error(&mut ctx, "connection refused", i * 1000);
    }
    assert_eq!(is_stuck_in_loop(&ctx, 5, 3, 5000), Some(StuckReason::IdenticalConsecutiveErrors));
}

#[test]
fn five_provider_5xx_errors_trigger_stuck() {
    let mut ctx = Context::new();
    for (i, code) in ["500", "502", "503", "504", "502"].iter().enumerate() {
        record_error(&mut ctx, format!("status code {code}"), i as u64 * 1000);
    }
    assert_eq!(is_stuck_in_loop(&ctx, 5, 3, 5000), Some(StuckReason::RepeatedProviderErrors));
}

#[test]
fn suggest_next_steps_flags_read_only_exploration() {
    let mut ctx = Context::new();
    for i in 0..3 {
        record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "a.go".to_string(), at_ms: i * 1000 });
    }
    let hints = suggest_next_steps(&ctx);
    assert!(hints.iter().any(|h| h.contains("made no changes")));
}

#[test]
fn suggest_next_steps_is_empty_with_no_history() {
    let ctx = Context::new();
    assert!(suggest_next_steps(&ctx).is_empty());
}
