// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ralph_core::test_support::ready_task;
use ralph_core::Agent;

fn agent_with_role(role: &str) -> Agent {
    Agent::builder().role(role).build()
}

#[test]
fn normalized_role_substring_matches_coder() {
    let agent = agent_with_role("Senior Software Engineer");
    let bead = ready_task("proj-a");
    assert_eq!(infer_agent_role(&agent, &bead), Some(RoleBucket::Coder));
}

#[test]
fn path_like_role_uses_last_segment() {
    let agent = agent_with_role("team/qa");
    let bead = ready_task("proj-a");
    assert_eq!(infer_agent_role(&agent, &bead), Some(RoleBucket::Qa));
}

#[test]
fn parenthetical_is_stripped_before_matching() {
    let agent = agent_with_role("Code Reviewer (contract)");
    let bead = ready_task("proj-a");
    assert_eq!(infer_agent_role(&agent, &bead), Some(RoleBucket::Reviewer));
}

#[test]
fn falls_back_to_bead_title_when_role_has_no_match() {
    let agent = agent_with_role("generalist");
    let mut bead = ready_task("proj-a");
    bead.title = "Fix the login bug".to_string();
    assert_eq!(infer_agent_role(&agent, &bead), Some(RoleBucket::Coder));

    let mut review_bead = ready_task("proj-a");
    review_bead.title = "Review the auth PR".to_string();
    let architect = agent_with_role("generalist");
    assert_eq!(infer_agent_role(&architect, &review_bead), Some(RoleBucket::Reviewer));
}
