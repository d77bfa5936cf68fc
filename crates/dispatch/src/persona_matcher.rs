// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PersonaMatcher: extracts a role hint from a bead and picks an idle
//! agent for it (spec §2, §4.2 "Agent match").

use ralph_core::{Agent, Bead};

const ROLE_HINTS: &[&str] = &["coder", "reviewer", "qa", "pm", "architect", "engineering-manager", "cto", "chief-technology-officer"];

/// Extract a role hint by scanning title, description, then tags (in
/// that order) for a known hint substring.
pub fn extract_persona_hint(bead: &Bead) -> Option<&'static str> {
    let haystacks = [bead.title.to_lowercase(), bead.description.to_lowercase()];
    for haystack in &haystacks {
        if let Some(hint) = ROLE_HINTS.iter().find(|hint| haystack.contains(*hint)) {
            return Some(hint);
        }
    }
    for tag in &bead.tags {
        let tag_lower = tag.to_lowercase();
        if let Some(hint) = ROLE_HINTS.iter().find(|hint| tag_lower.contains(*hint)) {
            return Some(hint);
        }
    }
    None
}

/// Pick an idle agent for `bead` from `idle_agents` (spec §4.2 Agent
/// match): prefer an exact role match on the extracted hint; else
/// prefer `engineering-manager`; else fall back to any project-compatible
/// idle agent.
pub fn match_agent_for_bead<'a>(bead: &Bead, idle_agents: &'a [Agent]) -> Option<&'a Agent> {
    let project_compatible = |a: &&Agent| a.project_compatible(&bead.project);

    if let Some(hint) = extract_persona_hint(bead) {
        if let Some(agent) = idle_agents.iter().filter(project_compatible).find(|a| normalize_role(&a.role) == hint) {
            return Some(agent);
        }
    }

    if let Some(agent) = idle_agents.iter().filter(project_compatible).find(|a| normalize_role(&a.role) == "engineering-manager") {
        return Some(agent);
    }

    idle_agents.iter().find(project_compatible)
}

fn normalize_role(role: &str) -> String {
    role.to_lowercase().replace([' ', '_'], "-")
}

#[cfg(test)]
#[path = "persona_matcher_tests.rs"]
mod tests;
