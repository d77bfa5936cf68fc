// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn idle_agent_is_dispatchable_for_matching_project() {
    let agent = Agent::builder().project_id("proj-a").status(AgentStatus::Idle).build();
    assert!(agent.is_dispatchable_for_project("proj-a"));
}

#[test]
fn working_agent_is_never_dispatchable() {
    let agent = Agent::builder().project_id("proj-a").status(AgentStatus::Working).build();
    assert!(!agent.is_dispatchable_for_project("proj-a"));
}

#[test]
fn empty_project_on_either_side_is_compatible() {
    let agent = Agent::builder().project_id("").build();
    assert!(agent.project_compatible("proj-a"));

    let agent = Agent::builder().project_id("proj-a").build();
    assert!(agent.project_compatible(""));
}

#[test]
fn mismatched_nonempty_projects_are_incompatible() {
    let agent = Agent::builder().project_id("proj-a").build();
    assert!(!agent.project_compatible("proj-b"));
}

#[test]
fn is_actively_working_on_requires_matching_bead_and_status() {
    let bead_id = BeadId::new();
    let agent = Agent::builder()
        .status(AgentStatus::Working)
        .current_bead(bead_id)
        .build();
    assert!(agent.is_actively_working_on(&bead_id));
    assert!(!agent.is_actively_working_on(&BeadId::new()));

    let idle_same_bead = Agent::builder().status(AgentStatus::Idle).current_bead(bead_id).build();
    assert!(!idle_same_bead.is_actively_working_on(&bead_id));
}

#[test]
fn agent_id_string_conversions() {
    let id = AgentId::from("agt-1");
    assert_eq!(id.as_str(), "agt-1");
    assert_eq!(id, "agt-1");
}
