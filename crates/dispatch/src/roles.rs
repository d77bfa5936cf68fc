// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role inference (spec §4.7).
//!
//! Maps an agent's freeform role string, or a bead's type, onto one of
//! the canonical dispatch target buckets.

use ralph_core::{Agent, Bead, BeadType};

/// Canonical target bucket an agent/bead role normalizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleBucket {
    Coder,
    Reviewer,
    Qa,
    Pm,
    Architect,
}

impl RoleBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleBucket::Coder => "coder",
            RoleBucket::Reviewer => "reviewer",
            RoleBucket::Qa => "qa",
            RoleBucket::Pm => "pm",
            RoleBucket::Architect => "architect",
        }
    }
}

/// Lowercase, `_`/` ` → `-`, strip `(...)` parentheticals, keep only the
/// last `/`-separated path component.
fn normalize(role: &str) -> String {
    let last_segment = role.rsplit('/').next().unwrap_or(role);
    let mut out = String::with_capacity(last_segment.len());
    let mut in_parens = false;
    for ch in last_segment.chars() {
        match ch {
            '(' => in_parens = true,
            ')' => in_parens = false,
            _ if in_parens => {}
            ' ' | '_' => out.push('-'),
            c => out.extend(c.to_lowercase()),
        }
    }
    out
}

const CODER_SUBSTRINGS: &[&str] = &["coder", "engineer", "developer", "swe", "implement"];
const REVIEWER_SUBSTRINGS: &[&str] = &["review"];
const QA_SUBSTRINGS: &[&str] = &["qa", "test", "quality"];
const PM_SUBSTRINGS: &[&str] = &["pm", "product-manager", "project-manager"];
const ARCHITECT_SUBSTRINGS: &[&str] = &["architect"];

fn bucket_from_normalized_role(normalized: &str) -> Option<RoleBucket> {
    if ARCHITECT_SUBSTRINGS.iter().any(|s| normalized.contains(s)) {
        return Some(RoleBucket::Architect);
    }
    if REVIEWER_SUBSTRINGS.iter().any(|s| normalized.contains(s)) {
        return Some(RoleBucket::Reviewer);
    }
    if QA_SUBSTRINGS.iter().any(|s| normalized.contains(s)) {
        return Some(RoleBucket::Qa);
    }
    if PM_SUBSTRINGS.iter().any(|s| normalized.contains(s)) {
        return Some(RoleBucket::Pm);
    }
    if CODER_SUBSTRINGS.iter().any(|s| normalized.contains(s)) {
        return Some(RoleBucket::Coder);
    }
    None
}

fn bucket_from_bead_type(bead: &Bead) -> Option<RoleBucket> {
    let title = bead.title.to_lowercase();
    if title.contains("review") {
        return Some(RoleBucket::Reviewer);
    }
    if title.contains("test") {
        return Some(RoleBucket::Qa);
    }
    if title.contains("bug") || title.contains("feature") || bead.bead_type == BeadType::Task {
        return Some(RoleBucket::Coder);
    }
    None
}

/// `inferAgentRole(agent, bead)`: substring-match on the agent's
/// normalized role, falling back to the bead's own signal.
pub fn infer_agent_role(agent: &Agent, bead: &Bead) -> Option<RoleBucket> {
    let normalized = normalize(&agent.role);
    bucket_from_normalized_role(&normalized).or_else(|| bucket_from_bead_type(bead))
}

#[cfg(test)]
#[path = "roles_tests.rs"]
mod tests;
