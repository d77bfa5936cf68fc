// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Selector (spec §4.2): pure functions over `(bead, agent maps,
//! configuration)` that decide whether a ready bead is dispatchable and,
//! if so, to which agent.
//!
//! "Pure" here means deterministic and side-effect-free *outside the
//! returned bead*: rules that annotate context (auto-enable redispatch,
//! dead-agent clearing, `ralphAutoBlock`) mutate the `Bead` passed in and
//! the caller persists it — nothing is written behind the selector's back.

use crate::auto_bug_router;
use crate::config::DispatchConfig;
use crate::loop_detector;
use crate::persona_matcher;
use ralph_core::context::{self};
use ralph_core::{Agent, AgentId, AgentStatus, Bead, BeadId, BeadStatus, BeadType, Priority};
use std::collections::HashSet;

/// Why a candidate bead was passed over, in rule-evaluation order
/// (spec §4.2 table). Each variant is the observability counter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyInflight,
    RequiresHumanConfig,
    DecisionType,
    TerminalReason,
    CooldownAfterFailure,
    AlreadyRun,
    RetryCooldown,
    AssignedAgentBusy,
    WorkflowGateMismatch,
    NoIdleAgentsForProject,
}

impl SkipReason {
    pub fn counter_key(self) -> &'static str {
        match self {
            SkipReason::AlreadyInflight => "already_inflight",
            SkipReason::RequiresHumanConfig => "requires_human_config",
            SkipReason::DecisionType => "decision_type",
            SkipReason::TerminalReason => "terminal_reason",
            SkipReason::CooldownAfterFailure => "cooldown_after_failure",
            SkipReason::AlreadyRun => "already_run",
            SkipReason::RetryCooldown => "retry_cooldown",
            SkipReason::AssignedAgentBusy => "assigned_agent_busy",
            SkipReason::WorkflowGateMismatch => "workflow_gate_mismatch",
            SkipReason::NoIdleAgentsForProject => "no_idle_agents_for_project",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    Skip(SkipReason),
    /// `ralphAutoBlock` fired; the bead passed in has already been
    /// mutated to `status=blocked` with the required annotations.
    Blocked,
    Matched(AgentId),
}

const TERMINAL_REASONS: &[&str] = &["parse_failures", "max_iterations", "completed"];
const TRIAGE_ROLES: &[&str] = &["cto", "chief-technology-officer", "engineering-manager"];

/// Optional workflow-gate check, resolved by the caller (it needs the
/// async `WorkflowEngine`) and handed in as a plain bool.
pub struct WorkflowGate {
    pub required_role_matches_idle_agent: bool,
}

pub struct SelectorInput<'a> {
    pub idle_agents: &'a [Agent],
    pub project_agents: &'a [Agent],
    pub all_agents: &'a [Agent],
    pub inflight: &'a HashSet<BeadId>,
    pub config: &'a DispatchConfig,
    pub now_ms: u64,
    pub workflow_gate: Option<WorkflowGate>,
}

/// Evaluate one candidate bead against the rules in spec §4.2, mutating
/// `bead` in place where a rule calls for an annotation.
pub fn evaluate(bead: &mut Bead, input: &SelectorInput) -> SelectorOutcome {
    if input.inflight.contains(&bead.id) {
        return SelectorOutcome::Skip(SkipReason::AlreadyInflight);
    }
    if bead.has_tag(context::REQUIRES_HUMAN_CONFIG_TAG) {
        return SelectorOutcome::Skip(SkipReason::RequiresHumanConfig);
    }

    if let Some(role) = persona_matcher::extract_persona_hint(bead) {
        if let Some(rewritten) = auto_bug_router::rewrite_title_for_role(&bead.title, role) {
            bead.title = rewritten;
        }
    }

    if bead.bead_type == BeadType::Decision {
        return SelectorOutcome::Skip(SkipReason::DecisionType);
    }

    if let Some(reason) = context::get_string(&bead.context, context::TERMINAL_REASON) {
        if TERMINAL_REASONS.contains(&reason) {
            return SelectorOutcome::Skip(SkipReason::TerminalReason);
        }
    }

    if let Some(last_failed) = context::get_u64(&bead.context, context::LAST_FAILED_AT) {
        if input.now_ms.saturating_sub(last_failed) < input.config.failure_cooldown.as_millis() as u64 {
            return SelectorOutcome::Skip(SkipReason::CooldownAfterFailure);
        }
    }

    let redispatch_requested = context::get_bool(&bead.context, context::REDISPATCH_REQUESTED);
    if matches!(bead.status, BeadStatus::Done | BeadStatus::Closed | BeadStatus::Cancelled) && !redispatch_requested {
        return SelectorOutcome::Skip(SkipReason::AlreadyRun);
    }

    if bead.status == BeadStatus::Open {
        if let Some(last_run) = context::get_u64(&bead.context, context::LAST_RUN_AT) {
            if input.now_ms.saturating_sub(last_run) < input.config.retry_cooldown.as_millis() as u64 {
                return SelectorOutcome::Skip(SkipReason::RetryCooldown);
            }
        }
    }

    if matches!(bead.status, BeadStatus::Open | BeadStatus::InProgress) && !redispatch_requested {
        context::set_bool(&mut bead.context, context::REDISPATCH_REQUESTED, true);
    }

    let dispatch_count = context::get_u32(&bead.context, context::DISPATCH_COUNT);
    if dispatch_count >= input.config.hard_dispatch_limit() {
        apply_ralph_auto_block(bead, input.project_agents, input.all_agents, "hard_dispatch_limit_exceeded", input.now_ms);
        return SelectorOutcome::Blocked;
    }

    if let Some(outcome) = apply_hop_limit_policy(bead, input) {
        return outcome;
    }

    if let Some(assigned) = bead.assigned_to.clone() {
        match input.all_agents.iter().find(|a| a.id == assigned) {
            None => {
                // dead_agent_cleared: assigned to an unknown agent, clear and continue.
                bead.assigned_to = None;
            }
            Some(agent) if agent.is_actively_working_on(&bead.id) => {
                return SelectorOutcome::Skip(SkipReason::AssignedAgentBusy);
            }
            Some(_) => {
                // Assigned but not actively working this bead: falls through to rematch.
            }
        }
    }

    if let Some(gate) = &input.workflow_gate {
        if !gate.required_role_matches_idle_agent {
            return SelectorOutcome::Skip(SkipReason::WorkflowGateMismatch);
        }
    }

    match persona_matcher::match_agent_for_bead(bead, input.idle_agents) {
        Some(agent) => SelectorOutcome::Matched(agent.id.clone()),
        None => SelectorOutcome::Skip(SkipReason::NoIdleAgentsForProject),
    }
}

/// Hop-limit policy (spec §4.2.1). Returns `Some` when dispatch should
/// stop considering this bead this cycle (either blocked or judged
/// "progressing but at risk" continues, so that case returns `None`).
fn apply_hop_limit_policy(bead: &mut Bead, input: &SelectorInput) -> Option<SelectorOutcome> {
    let dispatch_count = context::get_u32(&bead.context, context::DISPATCH_COUNT);
    if dispatch_count < input.config.max_hops {
        return None;
    }

    let already_escalated = context::get_string(&bead.context, context::ESCALATED_TO_CEO_DECISION_ID).is_some();
    let stuck = already_escalated
        || loop_detector::is_stuck_in_loop(&bead.context, dispatch_count, input.config.repeat_threshold, input.now_ms).is_some();

    if !stuck {
        tracing::info!(bead_id = %bead.id, dispatch_count, "progressing but at risk");
        return None;
    }

    apply_ralph_auto_block(bead, input.project_agents, input.all_agents, "hop_limit_exceeded_and_stuck", input.now_ms);
    Some(SelectorOutcome::Blocked)
}

/// `triageAgent(project)` (glossary): CTO > Engineering Manager > any
/// project agent > any agent.
pub fn triage_agent<'a>(project_agents: &'a [Agent], all_agents: &'a [Agent]) -> Option<&'a Agent> {
    for role in TRIAGE_ROLES {
        if let Some(agent) = project_agents.iter().find(|a| normalize_role(&a.role) == *role) {
            return Some(agent);
        }
    }
    project_agents.first().or_else(|| all_agents.first())
}

fn normalize_role(role: &str) -> String {
    role.to_lowercase().replace([' ', '_'], "-")
}

/// `ralphAutoBlock` (spec §4.2.2). Does not overwrite an existing
/// `escalated_to_ceo_decision_id` (spec §8 round-trip property).
pub fn apply_ralph_auto_block(
    bead: &mut Bead,
    project_agents: &[Agent],
    all_agents: &[Agent],
    reason: &str,
    now_ms: u64,
) {
    bead.status = BeadStatus::Blocked;
    bead.assigned_to = triage_agent(project_agents, all_agents).map(|a| a.id.clone());
    context::set_u64(&mut bead.context, context::RALPH_BLOCKED_AT, now_ms);
    context::set_string(&mut bead.context, context::RALPH_BLOCKED_REASON, reason);
    context::set_string(&mut bead.context, context::LOOP_DETECTED_REASON, reason);
    let hints = loop_detector::suggest_next_steps(&bead.context);
    let summary = if hints.is_empty() { "no progress signal available".to_string() } else { hints.join(" ") };
    context::set_string(&mut bead.context, context::PROGRESS_SUMMARY, summary);
    if context::get_string(&bead.context, context::REVERT_STATUS).is_none() {
        let revert_status = derive_revert_status(&bead.context);
        context::set_string(&mut bead.context, context::REVERT_STATUS, revert_status);
    }
}

/// Derive `revert_status` (spec §4.2.2) from whatever commit SHAs the
/// commit serializer has recorded on this bead: no commits recorded,
/// a single commit, or a range spanning the first and last.
fn derive_revert_status(ctx: &context::Context) -> String {
    let first = context::get_string(ctx, context::FIRST_COMMIT_SHA);
    let last = context::get_string(ctx, context::LAST_COMMIT_SHA);
    match (first, last) {
        (Some(first), Some(last)) if first == last => format!("single_commit:{first}"),
        (Some(first), Some(last)) => format!("commit_range:{first}..{last}"),
        (Some(only), None) | (None, Some(only)) => format!("single_commit:{only}"),
        (None, None) => "no_commits_recorded".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    priority: Priority,
    reverse_updated_at: std::cmp::Reverse<Option<u64>>,
}

/// Sort ready beads by `(priority ascending, updated_at descending)`,
/// nils last, stable (spec §4.1 step 4).
pub fn sort_ready_beads(beads: &mut [Bead]) {
    beads.sort_by_key(|b| SortKey { priority: b.priority, reverse_updated_at: std::cmp::Reverse(b.updated_at_ms) });
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
