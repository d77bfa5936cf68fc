// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference in-memory implementations of the store traits.
//!
//! Used by the daemon when no external persistence is wired in, and by
//! every dispatch test in `ralph-dispatch`.

use crate::error::{StoreError, StoreResult};
use crate::traits::{AgentStore, BeadStore, BeadUpdate, DependencyKind, ProviderRegistry};
use crate::workgraph;
use async_trait::async_trait;
use parking_lot::Mutex;
use ralph_core::{Agent, AgentId, AgentStatus, Bead, BeadId, BeadStatus, DecisionId, Model, Provider, ProviderId, ProviderStatus};
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryBeadStore {
    beads: Mutex<HashMap<BeadId, Bead>>,
}

impl InMemoryBeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bead: Bead) {
        self.beads.lock().insert(bead.id, bead);
    }

    pub fn snapshot(&self, id: &BeadId) -> Option<Bead> {
        self.beads.lock().get(id).cloned()
    }
}

#[async_trait]
impl BeadStore for InMemoryBeadStore {
    async fn list_ready(&self, project: &str) -> StoreResult<Vec<Bead>> {
        let beads = self.beads.lock();
        let statuses: HashMap<BeadId, BeadStatus> = beads.values().map(|b| (b.id, b.status)).collect();
        Ok(beads
            .values()
            .filter(|b| b.project == project)
            .filter(|b| b.bead_type != ralph_core::BeadType::Decision)
            .filter(|b| workgraph::is_ready(b, |id| statuses.get(id).copied()))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &BeadId) -> StoreResult<Bead> {
        self.beads.lock().get(id).cloned().ok_or_else(|| StoreError::BeadNotFound(*id))
    }

    async fn create(&self, bead: Bead) -> StoreResult<()> {
        self.beads.lock().insert(bead.id, bead);
        Ok(())
    }

    async fn claim(&self, bead_id: &BeadId, agent: &AgentId) -> StoreResult<()> {
        let mut beads = self.beads.lock();
        let bead = beads.get_mut(bead_id).ok_or(StoreError::BeadNotFound(*bead_id))?;
        if let Some(current) = &bead.assigned_to {
            if current != agent {
                return Err(StoreError::AlreadyClaimed { bead: *bead_id, current: current.clone(), requested: agent.clone() });
            }
            return Ok(());
        }
        bead.assigned_to = Some(agent.clone());
        Ok(())
    }

    async fn reassign(&self, bead_id: &BeadId, new_agent: &AgentId, _old_agent: Option<&AgentId>) -> StoreResult<()> {
        let mut beads = self.beads.lock();
        let bead = beads.get_mut(bead_id).ok_or(StoreError::BeadNotFound(*bead_id))?;
        bead.assigned_to = Some(new_agent.clone());
        Ok(())
    }

    async fn update(&self, id: &BeadId, patch: BeadUpdate) -> StoreResult<()> {
        let mut beads = self.beads.lock();
        let bead = beads.get_mut(id).ok_or(StoreError::BeadNotFound(*id))?;
        if let Some(status) = patch.status {
            bead.status = status;
        }
        if let Some(priority) = patch.priority {
            bead.priority = priority;
        }
        if let Some(assigned_to) = patch.assigned_to {
            bead.assigned_to = assigned_to;
        }
        if let Some(context) = patch.context {
            bead.context = context;
        }
        if let Some(tags) = patch.tags {
            bead.tags = tags;
        }
        if let Some(title) = patch.title {
            bead.title = title;
        }
        Ok(())
    }

    async fn add_dependency(&self, parent: &BeadId, child: &BeadId, kind: DependencyKind) -> StoreResult<()> {
        let mut beads = self.beads.lock();
        match kind {
            DependencyKind::Blocks => {
                if let Some(p) = beads.get_mut(parent) {
                    p.blocks.insert(*child);
                }
                if let Some(c) = beads.get_mut(child) {
                    c.blocked_by.insert(*parent);
                }
            }
            DependencyKind::Parent => {
                if let Some(c) = beads.get_mut(child) {
                    c.parent = Some(*parent);
                }
                if let Some(p) = beads.get_mut(parent) {
                    p.children.insert(*child);
                }
            }
            DependencyKind::RelatedTo => {
                if let Some(p) = beads.get_mut(parent) {
                    p.related_to.insert(*child);
                }
                if let Some(c) = beads.get_mut(child) {
                    c.related_to.insert(*parent);
                }
            }
        }
        Ok(())
    }

    async fn unblock_bead(&self, id: &BeadId, decision: &DecisionId) -> StoreResult<()> {
        let mut beads = self.beads.lock();
        let bead = beads.get_mut(id).ok_or(StoreError::BeadNotFound(*id))?;
        bead.blocked_by.clear();
        bead.status = BeadStatus::Open;
        ralph_core::context::set_string(&mut bead.context, ralph_core::context::ESCALATED_TO_CEO_DECISION_ID, decision.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAgentStore {
    agents: Mutex<HashMap<AgentId, Agent>>,
}

impl InMemoryAgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, agent: Agent) {
        self.agents.lock().insert(agent.id.clone(), agent);
    }

    pub fn snapshot(&self, id: &AgentId) -> Option<Agent> {
        self.agents.lock().get(id).cloned()
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn list_by_project(&self, project: &str) -> StoreResult<Vec<Agent>> {
        Ok(self.agents.lock().values().filter(|a| a.project_compatible(project)).cloned().collect())
    }

    async fn get(&self, id: &AgentId) -> StoreResult<Agent> {
        self.agents.lock().get(id).cloned().ok_or_else(|| StoreError::AgentNotFound(id.clone()))
    }

    async fn get_idle_by_project(&self, project: &str) -> StoreResult<Vec<Agent>> {
        Ok(self
            .agents
            .lock()
            .values()
            .filter(|a| a.is_dispatchable_for_project(project))
            .cloned()
            .collect())
    }

    async fn assign_bead(&self, agent_id: &AgentId, bead: &BeadId) -> StoreResult<()> {
        let mut agents = self.agents.lock();
        let agent = agents.get_mut(agent_id).ok_or_else(|| StoreError::AgentNotFound(agent_id.clone()))?;
        agent.status = AgentStatus::Working;
        agent.current_bead = Some(*bead);
        Ok(())
    }

    async fn update_agent_project(&self, agent_id: &AgentId, project: &str) -> StoreResult<()> {
        let mut agents = self.agents.lock();
        let agent = agents.get_mut(agent_id).ok_or_else(|| StoreError::AgentNotFound(agent_id.clone()))?;
        agent.project_id = project.to_string();
        Ok(())
    }

    async fn restore_agent(&self, agent_id: &AgentId) -> StoreResult<()> {
        let mut agents = self.agents.lock();
        let agent = agents.get_mut(agent_id).ok_or_else(|| StoreError::AgentNotFound(agent_id.clone()))?;
        if agent.status == AgentStatus::Paused {
            agent.status = AgentStatus::Idle;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProviderRegistry {
    providers: Mutex<HashMap<ProviderId, Provider>>,
}

impl InMemoryProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderRegistry for InMemoryProviderRegistry {
    async fn list_active(&self) -> StoreResult<Vec<Provider>> {
        Ok(self.providers.lock().values().filter(|p| p.is_active()).cloned().collect())
    }

    async fn is_active(&self, id: &ProviderId) -> StoreResult<bool> {
        Ok(self.providers.lock().get(id).map(|p| p.is_active()).unwrap_or(false))
    }

    async fn upsert(&self, provider: Provider) -> StoreResult<()> {
        self.providers.lock().insert(provider.id, provider);
        Ok(())
    }

    async fn get(&self, id: &ProviderId) -> StoreResult<Provider> {
        self.providers.lock().get(id).cloned().ok_or(StoreError::ProviderNotFound(*id))
    }

    async fn get_models(&self, id: &ProviderId) -> StoreResult<Vec<Model>> {
        let providers = self.providers.lock();
        let provider = providers.get(id).ok_or(StoreError::ProviderNotFound(*id))?;
        Ok(vec![Model { id: provider.configured_model.clone(), name: provider.configured_model.clone() }])
    }
}

impl InMemoryProviderRegistry {
    pub fn mark_inactive(&self, id: &ProviderId) {
        if let Some(p) = self.providers.lock().get_mut(id) {
            p.status = ProviderStatus::Inactive;
        }
    }
}

#[cfg(test)]
#[path = "in_memory_tests.rs"]
mod tests;
