// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ralph_core::test_support::{idle_agent, ready_task};
use ralph_core::Agent;

#[test]
fn extracts_hint_from_title() {
    let mut bead = ready_task("proj-a");
    bead.title = "QA the login flow".to_string();
    assert_eq!(extract_persona_hint(&bead), Some("qa"));
}

#[test]
fn no_hint_returns_none() {
    let bead = ready_task("proj-a");
    assert_eq!(extract_persona_hint(&bead), None);
}

#[test]
fn prefers_exact_role_match_on_hint() {
    let mut bead = ready_task("proj-a");
    bead.title = "Reviewer: check the PR".to_string();
    let qa = Agent::builder().role("qa").project_id("proj-a").build();
    let reviewer = Agent::builder().role("reviewer").project_id("proj-a").build();
    let agents = vec![qa, reviewer.clone()];

    let matched = match_agent_for_bead(&bead, &agents).unwrap();
    assert_eq!(matched.id, reviewer.id);
}

#[test]
fn falls_back_to_engineering_manager_when_no_hint() {
    let bead = ready_task("proj-a");
    let em = Agent::builder().role("engineering-manager").project_id("proj-a").build();
    let other = idle_agent("proj-a");
    let agents = vec![other, em.clone()];

    let matched = match_agent_for_bead(&bead, &agents).unwrap();
    assert_eq!(matched.id, em.id);
}

#[test]
fn falls_back_to_any_project_compatible_agent() {
    let bead = ready_task("proj-a");
    let agent = idle_agent("proj-a");
    let agents = vec![agent.clone()];

    let matched = match_agent_for_bead(&bead, &agents).unwrap();
    assert_eq!(matched.id, agent.id);
}

#[test]
fn rejects_agents_from_other_projects() {
    let bead = ready_task("proj-a");
    let agent = idle_agent("proj-b");
    let agents = vec![agent];
    assert!(match_agent_for_bead(&bead, &agents).is_none());
}
