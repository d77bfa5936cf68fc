// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed accessors over a bead's `context: HashMap<String, String>`.
//!
//! The context map is deliberately untyped storage (see spec §9,
//! "context-map as schema"): dispatch heuristics can add a new key
//! without a persistence migration. Every reader here tolerates a
//! missing or unparseable value by falling back to an empty/default
//! result instead of erroring.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

pub type Context = HashMap<String, String>;

// Well-known keys. Grouped by the component that owns them.
pub const DISPATCH_COUNT: &str = "dispatch_count";
pub const DISPATCH_HISTORY: &str = "dispatch_history";
pub const LAST_RUN_AT: &str = "last_run_at";
pub const LAST_FAILED_AT: &str = "last_failed_at";
pub const LAST_RUN_ERROR: &str = "last_run_error";
pub const TERMINAL_REASON: &str = "terminal_reason";
pub const LOOP_DETECTED: &str = "loop_detected";
pub const LOOP_DETECTED_REASON: &str = "loop_detected_reason";
pub const REDISPATCH_REQUESTED: &str = "redispatch_requested";
pub const ACTION_HISTORY: &str = "action_history";
pub const PROGRESS_METRICS: &str = "progress_metrics";
pub const ERROR_HISTORY: &str = "error_history";
pub const ESCALATED_TO_CEO_DECISION_ID: &str = "escalated_to_ceo_decision_id";
pub const CONVERSATION_SESSION_ID: &str = "conversation_session_id";

pub const AGENT_ID: &str = "agent_id";
pub const PROVIDER_ID: &str = "provider_id";
pub const PROVIDER_MODEL: &str = "provider_model";
pub const AGENT_OUTPUT: &str = "agent_output";
pub const AGENT_TOKENS: &str = "agent_tokens";
pub const AGENT_TASK_ID: &str = "agent_task_id";
pub const AGENT_WORKER_ID: &str = "agent_worker_id";

pub const MAX_ITERATIONS_RETRIES: &str = "max_iterations_retries";
pub const MAX_ITERATIONS_RETRY_EXHAUSTED: &str = "max_iterations_retry_exhausted";
pub const REMEDIATION_NEEDED: &str = "remediation_needed";
pub const STUCK_AT: &str = "stuck_at";

pub const RALPH_BLOCKED_AT: &str = "ralph_blocked_at";
pub const RALPH_BLOCKED_REASON: &str = "ralph_blocked_reason";
pub const PROGRESS_SUMMARY: &str = "progress_summary";
pub const REVERT_STATUS: &str = "revert_status";
pub const FIRST_COMMIT_SHA: &str = "first_commit_sha";
pub const LAST_COMMIT_SHA: &str = "last_commit_sha";

pub const REQUIRES_HUMAN_CONFIG_TAG: &str = "requires-human-config";
pub const WORKFLOW_REQUIRED_TAG: &str = "workflow-required";
pub const STRICT_WORKFLOW_TAG: &str = "strict-workflow";

/// Any key whose presence satisfies the "a reason must appear in context"
/// invariant for a blocked bead.
const BLOCK_REASON_KEYS: &[&str] = &[RALPH_BLOCKED_REASON];

pub fn has_block_reason(ctx: &Context) -> bool {
    BLOCK_REASON_KEYS.iter().any(|k| ctx.contains_key(*k))
}

pub fn get_string<'a>(ctx: &'a Context, key: &str) -> Option<&'a str> {
    ctx.get(key).map(|s| s.as_str())
}

pub fn set_string(ctx: &mut Context, key: &str, value: impl Into<String>) {
    ctx.insert(key.to_string(), value.into());
}

pub fn get_u32(ctx: &Context, key: &str) -> u32 {
    ctx.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

pub fn set_u32(ctx: &mut Context, key: &str, value: u32) {
    ctx.insert(key.to_string(), value.to_string());
}

pub fn get_bool(ctx: &Context, key: &str) -> bool {
    ctx.get(key).map(|v| v == "true").unwrap_or(false)
}

pub fn set_bool(ctx: &mut Context, key: &str, value: bool) {
    ctx.insert(key.to_string(), value.to_string());
}

pub fn get_u64(ctx: &Context, key: &str) -> Option<u64> {
    ctx.get(key).and_then(|v| v.parse().ok())
}

pub fn set_u64(ctx: &mut Context, key: &str, value: u64) {
    ctx.insert(key.to_string(), value.to_string());
}

/// Parse a JSON-encoded list stored under `key`. Missing or malformed
/// values are treated as an empty list, never an error.
pub fn get_json_list<T: DeserializeOwned>(ctx: &Context, key: &str) -> Vec<T> {
    ctx.get(key).and_then(|raw| serde_json::from_str(raw).ok()).unwrap_or_default()
}

pub fn set_json_list<T: Serialize>(ctx: &mut Context, key: &str, list: &[T]) {
    if let Ok(raw) = serde_json::to_string(list) {
        ctx.insert(key.to_string(), raw);
    }
}

/// Append `item` to the JSON list at `key`, keeping only the last `cap`
/// entries (oldest dropped first). This is the shared implementation
/// behind `dispatch_history` (cap 20), `action_history` (cap 50), and
/// `error_history` (cap 20).
pub fn push_bounded_json_list<T: Serialize + DeserializeOwned>(
    ctx: &mut Context,
    key: &str,
    item: T,
    cap: usize,
) -> Vec<T> {
    let mut list: Vec<T> = get_json_list(ctx, key);
    list.push(item);
    if list.len() > cap {
        let excess = list.len() - cap;
        list.drain(0..excess);
    }
    set_json_list(ctx, key, &list);
    list
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
