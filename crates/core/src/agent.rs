// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier and entity.
//!
//! An agent is a long-lived worker bound to a persona and a provider.
//! `AgentId` is distinct from whatever session identifier the worker
//! implementation uses internally — that detail is hidden behind the
//! worker execution interface the dispatch core is given.

use crate::bead::BeadId;
use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an agent instance.
    pub struct AgentId("agt-");
}

/// Status of an agent, as tracked by the agent store.
///
/// `Working` agents are never reassigned by the selector (spec §3); an
/// idle agent bound to a healthy provider is "dispatchable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Working,
    Paused,
    Dead,
}

crate::simple_display! {
    AgentStatus {
        Idle => "idle",
        Working => "working",
        Paused => "paused",
        Dead => "dead",
    }
}

/// A long-lived worker bound to a persona and a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub persona_name: String,
    pub role: String,
    pub project_id: String,
    pub provider_id: ProviderId,
    pub status: AgentStatus,
    pub current_bead: Option<BeadId>,
    /// Epoch milliseconds of the last heartbeat/activity.
    pub last_active_ms: u64,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, role: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            persona_name: String::new(),
            role: role.into(),
            project_id: project_id.into(),
            provider_id: ProviderId::new(),
            status: AgentStatus::Idle,
            current_bead: None,
            last_active_ms: 0,
        }
    }

    /// An idle agent whose project matches (or either side is unscoped).
    pub fn is_dispatchable_for_project(&self, project: &str) -> bool {
        self.status == AgentStatus::Idle && self.project_compatible(project)
    }

    pub fn project_compatible(&self, project: &str) -> bool {
        self.project_id.is_empty() || project.is_empty() || self.project_id == project
    }

    /// True if this agent is still working on the given bead, according to
    /// its live status. Used to resolve the "still working?" precedence
    /// rule fixed in spec §9: live-agent status wins over `assigned_to`.
    pub fn is_actively_working_on(&self, bead_id: &BeadId) -> bool {
        self.status == AgentStatus::Working && self.current_bead.as_ref() == Some(bead_id)
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        into {
            name: String = "test-agent",
            role: String = "engineering-manager",
            project_id: String = "",
            persona_name: String = "",
        }
        set {
            status: AgentStatus = AgentStatus::Idle,
            provider_id: ProviderId = ProviderId::new(),
            last_active_ms: u64 = 0,
        }
        option {
            current_bead: BeadId = None,
        }
        computed {
            id: AgentId = AgentId::new(),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
