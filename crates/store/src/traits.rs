// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD interfaces for the three core entity kinds (spec §6).
//!
//! Dispatch is injected an `Arc<dyn BeadStore>` / `Arc<dyn AgentStore>` /
//! `Arc<dyn ProviderRegistry>` and never touches persistence directly.

use crate::error::StoreResult;
use async_trait::async_trait;
use ralph_core::{Agent, AgentId, Bead, BeadId, BeadStatus, Context, Model, Priority, Provider, ProviderId};

/// Dependency kind recorded by `AddDependency`. Only `blocks` affects
/// readiness; the others are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Blocks,
    Parent,
    RelatedTo,
}

/// Sparse patch applied by `BeadStore::update`. `None` fields are left
/// untouched; this mirrors the source's `map[string]any` update without
/// giving dispatch an untyped map to build by hand.
#[derive(Debug, Clone, Default)]
pub struct BeadUpdate {
    pub status: Option<BeadStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<Option<AgentId>>,
    pub context: Option<Context>,
    pub tags: Option<std::collections::HashSet<String>>,
    pub title: Option<String>,
}

impl BeadUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: BeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn assigned_to(mut self, agent: Option<AgentId>) -> Self {
        self.assigned_to = Some(agent);
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[async_trait]
pub trait BeadStore: Send + Sync + 'static {
    /// Beads in `project` whose status is dispatchable and whose blockers
    /// are all terminal (or absent).
    async fn list_ready(&self, project: &str) -> StoreResult<Vec<Bead>>;

    async fn get(&self, id: &BeadId) -> StoreResult<Bead>;

    /// Persist a newly-created bead (spec §4.1 step 6: CEO escalation
    /// spawns a fresh `decision` bead; workgraph ingestion spawns `task`/
    /// `epic` beads the same way).
    async fn create(&self, bead: Bead) -> StoreResult<()>;

    /// Claim an unassigned bead for `agent`. Fails if already claimed by
    /// someone else — the authoritative cross-process guard (spec §5).
    async fn claim(&self, bead: &BeadId, agent: &AgentId) -> StoreResult<()>;

    /// Move an assignment from `old_agent` to `new_agent`.
    async fn reassign(&self, bead: &BeadId, new_agent: &AgentId, old_agent: Option<&AgentId>) -> StoreResult<()>;

    async fn update(&self, id: &BeadId, patch: BeadUpdate) -> StoreResult<()>;

    async fn add_dependency(&self, parent: &BeadId, child: &BeadId, kind: DependencyKind) -> StoreResult<()>;

    /// Clear `blocked_by` against `decision` and reopen the bead.
    async fn unblock_bead(&self, id: &BeadId, decision: &ralph_core::DecisionId) -> StoreResult<()>;
}

#[async_trait]
pub trait AgentStore: Send + Sync + 'static {
    async fn list_by_project(&self, project: &str) -> StoreResult<Vec<Agent>>;

    async fn get(&self, id: &AgentId) -> StoreResult<Agent>;

    async fn get_idle_by_project(&self, project: &str) -> StoreResult<Vec<Agent>>;

    /// Transition `agent` to `working` and point it at `bead`.
    async fn assign_bead(&self, agent: &AgentId, bead: &BeadId) -> StoreResult<()>;

    async fn update_agent_project(&self, agent: &AgentId, project: &str) -> StoreResult<()>;

    /// Promote a `paused` agent with a now-valid provider back to `idle`.
    async fn restore_agent(&self, agent: &AgentId) -> StoreResult<()>;
}

#[async_trait]
pub trait ProviderRegistry: Send + Sync + 'static {
    async fn list_active(&self) -> StoreResult<Vec<Provider>>;

    async fn is_active(&self, id: &ProviderId) -> StoreResult<bool>;

    async fn upsert(&self, provider: Provider) -> StoreResult<()>;

    async fn get(&self, id: &ProviderId) -> StoreResult<Provider>;

    async fn get_models(&self, id: &ProviderId) -> StoreResult<Vec<Model>>;
}
