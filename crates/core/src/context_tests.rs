// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn missing_key_parses_as_default() {
    let ctx = Context::new();
    assert_eq!(get_u32(&ctx, DISPATCH_COUNT), 0);
    assert!(!get_bool(&ctx, LOOP_DETECTED));
    assert_eq!(get_string(&ctx, TERMINAL_REASON), None);
}

#[test]
fn malformed_value_parses_as_default_not_error() {
    let mut ctx = Context::new();
    ctx.insert(DISPATCH_COUNT.to_string(), "not-a-number".to_string());
    assert_eq!(get_u32(&ctx, DISPATCH_COUNT), 0);
}

#[test]
fn json_list_roundtrips() {
    let mut ctx = Context::new();
    set_json_list(&mut ctx, DISPATCH_HISTORY, &["a1".to_string(), "a2".to_string()]);
    let back: Vec<String> = get_json_list(&ctx, DISPATCH_HISTORY);
    assert_eq!(back, vec!["a1".to_string(), "a2".to_string()]);
}

#[test]
fn malformed_json_list_reads_as_empty() {
    let mut ctx = Context::new();
    ctx.insert(DISPATCH_HISTORY.to_string(), "{not json".to_string());
    let back: Vec<String> = get_json_list(&ctx, DISPATCH_HISTORY);
    assert!(back.is_empty());
}

#[test]
fn bounded_list_caps_at_limit_dropping_oldest() {
    let mut ctx = Context::new();
    for i in 0..25 {
        push_bounded_json_list(&mut ctx, DISPATCH_HISTORY, format!("agent-{i}"), 20);
    }
    let list: Vec<String> = get_json_list(&ctx, DISPATCH_HISTORY);
    assert_eq!(list.len(), 20);
    assert_eq!(list.first().unwrap(), "agent-5");
    assert_eq!(list.last().unwrap(), "agent-24");
}

#[test]
fn bounded_list_under_cap_keeps_everything() {
    let mut ctx = Context::new();
    push_bounded_json_list(&mut ctx, ERROR_HISTORY, "err1".to_string(), 20);
    push_bounded_json_list(&mut ctx, ERROR_HISTORY, "err2".to_string(), 20);
    let list: Vec<String> = get_json_list(&ctx, ERROR_HISTORY);
    assert_eq!(list, vec!["err1".to_string(), "err2".to_string()]);
}

#[test]
fn has_block_reason_detects_ralph_blocked_reason() {
    let mut ctx = Context::new();
    assert!(!has_block_reason(&ctx));
    set_string(&mut ctx, RALPH_BLOCKED_REASON, "hard_dispatch_limit_exceeded");
    assert!(has_block_reason(&ctx));
}

proptest::proptest! {
    /// For any cap and any number of pushes, the stored list never exceeds
    /// `cap` and always holds the most recently pushed entries in order.
    #[test]
    fn bounded_list_never_exceeds_cap_and_keeps_the_tail(cap in 1usize..30, pushes in 0usize..60) {
        let mut ctx = Context::new();
        for i in 0..pushes {
            push_bounded_json_list(&mut ctx, ACTION_HISTORY, i, cap);
        }
        let list: Vec<usize> = get_json_list(&ctx, ACTION_HISTORY);
        let expected_len = pushes.min(cap);
        prop_assert_eq!(list.len(), expected_len);
        let expected: Vec<usize> = (pushes.saturating_sub(expected_len)..pushes).collect();
        prop_assert_eq!(list, expected);
    }
}
