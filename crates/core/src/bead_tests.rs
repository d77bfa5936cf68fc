// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::context;

#[test]
fn priority_ordering_is_numerically_ascending() {
    let mut priorities = vec![Priority::P3, Priority::P0, Priority::P2, Priority::P1];
    priorities.sort();
    assert_eq!(priorities, vec![Priority::P0, Priority::P1, Priority::P2, Priority::P3]);
}

#[test]
fn fresh_bead_satisfies_invariants() {
    let bead = Bead::builder().build();
    assert!(bead.invariants_hold());
}

#[test]
fn in_progress_without_assignment_violates_invariant() {
    let bead = Bead::builder().status(BeadStatus::InProgress).build();
    assert!(!bead.invariants_hold());
}

#[test]
fn in_progress_with_assignment_satisfies_invariant() {
    let bead = Bead::builder()
        .status(BeadStatus::InProgress)
        .assigned_to(AgentId::from("agt-1"))
        .build();
    assert!(bead.invariants_hold());
}

#[test]
fn blocked_without_reason_violates_invariant() {
    let bead = Bead::builder().status(BeadStatus::Blocked).build();
    assert!(!bead.invariants_hold());
}

#[test]
fn blocked_with_reason_satisfies_invariant() {
    let mut ctx = context::Context::new();
    context::set_string(&mut ctx, context::RALPH_BLOCKED_REASON, "hard_dispatch_limit_exceeded");
    let bead = Bead::builder().status(BeadStatus::Blocked).context(ctx).build();
    assert!(bead.invariants_hold());
}

#[test]
fn has_tag_checks_membership() {
    let mut tags = HashSet::new();
    tags.insert("requires-human-config".to_string());
    let bead = Bead::builder().tags(tags).build();
    assert!(bead.has_tag("requires-human-config"));
    assert!(!bead.has_tag("other"));
}

#[test]
fn terminal_status_helpers() {
    assert!(BeadStatus::Done.is_terminal());
    assert!(BeadStatus::Closed.is_terminal());
    assert!(BeadStatus::Cancelled.is_terminal());
    assert!(!BeadStatus::Open.is_terminal());
    assert!(!BeadStatus::Blocked.is_terminal());
}
