// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LoopDetector (spec §4.8): classifies a bead as "stuck" from action
//! history, error history, and repeated progress keys — all carried in
//! the bead's context map, never in detector-owned state.

use ralph_core::context::{self, Context};
use serde::{Deserialize, Serialize};

/// Actions that count as making progress when they occur. Read-only
/// actions (`ReadFile`, `Glob`, `Grep`) are tracked but never refresh
/// `last_progress_ms` — the rule that stops endless exploration from
/// masquerading as progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    EditFile,
    WriteFile,
    CreateFile,
    RunTests,
    Bash,
    GitCommit,
    Done,
    ReadFile,
    Glob,
    Grep,
}

impl ActionType {
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            ActionType::EditFile
                | ActionType::WriteFile
                | ActionType::CreateFile
                | ActionType::RunTests
                | ActionType::Bash
                | ActionType::GitCommit
                | ActionType::Done
        )
    }
}

/// One recorded agent action, keyed by `(action_type, target)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_type: ActionType,
    pub target: String,
    pub at_ms: u64,
}

impl ActionRecord {
    pub fn progress_key(&self) -> String {
        format!("{:?}:{}", self.action_type, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub last_progress_ms: Option<u64>,
    pub last_progress_key: Option<String>,
    pub consecutive_repeats: u32,
}

const ACTION_HISTORY_CAP: usize = 50;
const ERROR_HISTORY_CAP: usize = 20;
const NO_RECENT_PROGRESS_MS: u64 = 5 * 60 * 1000;

/// Append an action to `action_history` (capped 50) and update
/// `progress_metrics` — only mutating actions refresh `last_progress_ms`.
pub fn record_action(ctx: &mut Context, record: ActionRecord) {
    let key = record.progress_key();
    let at_ms = record.at_ms;
    let is_mutating = record.action_type.is_mutating();
    context::push_bounded_json_list(ctx, context::ACTION_HISTORY, record, ACTION_HISTORY_CAP);

    let mut metrics = get_progress_metrics(ctx);
    if metrics.last_progress_key.as_deref() == Some(key.as_str()) {
        metrics.consecutive_repeats += 1;
    } else {
        metrics.consecutive_repeats = 1;
        metrics.last_progress_key = Some(key);
    }
    if is_mutating {
        metrics.last_progress_ms = Some(at_ms);
    }
    set_progress_metrics(ctx, &metrics);
}

/// Append an error to `error_history` (capped 20).
pub fn record_error(ctx: &mut Context, message: impl Into<String>, at_ms: u64) {
    context::push_bounded_json_list(ctx, context::ERROR_HISTORY, ErrorRecord { message: message.into(), at_ms }, ERROR_HISTORY_CAP);
}

pub fn get_progress_metrics(ctx: &Context) -> ProgressMetrics {
    context::get_string(ctx, context::PROGRESS_METRICS)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

fn set_progress_metrics(ctx: &mut Context, metrics: &ProgressMetrics) {
    if let Ok(raw) = serde_json::to_string(metrics) {
        context::set_string(ctx, context::PROGRESS_METRICS, raw);
    }
}

fn is_auth_error(message: &str) -> bool {
    message.contains("401") || message.contains("403") || message.contains("No api key")
}

fn is_provider_5xx(message: &str) -> bool {
    ["500", "502", "503", "504"].iter().any(|code| message.contains(code))
}

fn is_rate_limit(message: &str) -> bool {
    message.contains("429") || message.to_lowercase().contains("rate limit") || message.to_lowercase().contains("quota exceeded")
}

/// Reason a bead was judged stuck, for logging and escalation annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StuckReason {
    RepeatedAuthErrors,
    RepeatedProviderErrors,
    RepeatedRateLimitErrors,
    IdenticalConsecutiveErrors,
    NonProductiveRepetition,
}

impl StuckReason {
    pub fn message(&self) -> &'static str {
        match self {
            StuckReason::RepeatedAuthErrors => "repeated authentication errors",
            StuckReason::RepeatedProviderErrors => "repeated provider 5xx errors",
            StuckReason::RepeatedRateLimitErrors => "repeated rate-limit errors",
            StuckReason::IdenticalConsecutiveErrors => "identical consecutive errors",
            StuckReason::NonProductiveRepetition => "Repeated action pattern with no recent progress",
        }
    }
}

/// `IsStuckInLoop` (spec §4.8).
pub fn is_stuck_in_loop(ctx: &Context, dispatch_count: u32, repeat_threshold: u32, now_ms: u64) -> Option<StuckReason> {
    if dispatch_count >= 5 {
        if let Some(reason) = check_repeated_infra_errors(ctx) {
            return Some(reason);
        }
    }
    check_non_productive_repetition(ctx, repeat_threshold, now_ms)
}

fn check_repeated_infra_errors(ctx: &Context) -> Option<StuckReason> {
    let history: Vec<ErrorRecord> = context::get_json_list(ctx, context::ERROR_HISTORY);
    let last_10: Vec<&ErrorRecord> = history.iter().rev().take(10).collect();

    let auth_count = last_10.iter().filter(|e| is_auth_error(&e.message)).count();
    if auth_count >= 3 {
        return Some(StuckReason::RepeatedAuthErrors);
    }

    let provider_5xx_count = last_10.iter().filter(|e| is_provider_5xx(&e.message)).count();
    if provider_5xx_count >= 5 {
        return Some(StuckReason::RepeatedProviderErrors);
    }

    let rate_limit_count = last_10.iter().filter(|e| is_rate_limit(&e.message)).count();
    if rate_limit_count >= 5 {
        return Some(StuckReason::RepeatedRateLimitErrors);
    }

    if last_10.len() >= 5 {
        let first = &last_10[0].message;
        if last_10.iter().take(5).all(|e| &e.message == first) {
            return Some(StuckReason::IdenticalConsecutiveErrors);
        }
    }

    None
}

fn check_non_productive_repetition(ctx: &Context, repeat_threshold: u32, now_ms: u64) -> Option<StuckReason> {
    let metrics = get_progress_metrics(ctx);
    if metrics.consecutive_repeats < repeat_threshold {
        return None;
    }
    let stale = match metrics.last_progress_ms {
        Some(last) => now_ms.saturating_sub(last) >= NO_RECENT_PROGRESS_MS,
        None => true,
    };
    if stale {
        Some(StuckReason::NonProductiveRepetition)
    } else {
        None
    }
}

/// `SuggestNextSteps`: human-readable hints from action-type coverage.
pub fn suggest_next_steps(ctx: &Context) -> Vec<String> {
    let history: Vec<ActionRecord> = context::get_json_list(ctx, context::ACTION_HISTORY);
    if history.is_empty() {
        return Vec::new();
    }

    let mut hints = Vec::new();
    let has_mutation = history.iter().any(|a| a.action_type.is_mutating());
    let has_read = history.iter().any(|a| matches!(a.action_type, ActionType::ReadFile | ActionType::Glob | ActionType::Grep));
    if has_read && !has_mutation {
        hints.push("Agent read files but made no changes; try a more targeted edit.".to_string());
    }
    let has_tests = history.iter().any(|a| a.action_type == ActionType::RunTests);
    let has_commit = history.iter().any(|a| a.action_type == ActionType::GitCommit);
    if has_mutation && !has_tests {
        hints.push("Changes were made without running tests; verify before committing.".to_string());
    }
    if has_mutation && has_tests && !has_commit {
        hints.push("Tests ran but no commit followed; confirm the work is ready to land.".to_string());
    }
    hints
}

#[cfg(test)]
#[path = "loop_detector_tests.rs"]
mod tests;
