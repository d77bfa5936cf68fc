// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::{Agent, AgentId, AgentStatus};
use crate::bead::{Bead, BeadId, BeadStatus, BeadType, Priority};
use crate::provider::{Provider, ProviderId, ProviderStatus};

/// A ready, unassigned task bead in the given project.
pub fn ready_task(project: &str) -> Bead {
    Bead::builder().project(project).bead_type(BeadType::Task).status(BeadStatus::Open).build()
}

/// A task bead blocked on `blocker`.
pub fn blocked_on(project: &str, blocker: BeadId) -> Bead {
    let mut blocked_by = std::collections::HashSet::new();
    blocked_by.insert(blocker);
    Bead::builder().project(project).bead_type(BeadType::Task).blocked_by(blocked_by).build()
}

/// A P0 decision bead, never dispatchable.
pub fn decision_bead(project: &str) -> Bead {
    Bead::builder().project(project).bead_type(BeadType::Decision).priority(Priority::P0).build()
}

/// An idle agent scoped to `project` (empty string = unscoped).
pub fn idle_agent(project: &str) -> Agent {
    Agent::builder().project_id(project).status(AgentStatus::Idle).build()
}

/// An agent actively working on `bead_id`.
pub fn working_agent(project: &str, bead_id: BeadId) -> Agent {
    Agent::builder().project_id(project).status(AgentStatus::Working).current_bead(bead_id).build()
}

/// An active provider with a default endpoint and model.
pub fn active_provider() -> Provider {
    Provider::builder().status(ProviderStatus::Active).build()
}

pub fn inactive_provider() -> Provider {
    Provider::builder().status(ProviderStatus::Inactive).build()
}

pub fn fixed_agent_id(suffix: &str) -> AgentId {
    AgentId::from(format!("agt-{suffix}"))
}

pub fn fixed_provider_id(suffix: &str) -> ProviderId {
    ProviderId::from_string(format!("prv-{suffix}"))
}
