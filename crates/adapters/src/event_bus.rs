// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle event bus (spec §6).
//!
//! Ordering guarantee (spec §5): `bead.assigned` precedes
//! `bead.status_change(in_progress)`; `bead.status_change(closed|open)`
//! follows success/failure post-processing. No cross-bead ordering.

use async_trait::async_trait;
use ralph_core::{AgentId, BeadId, BeadStatus, DecisionId, ProviderId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

/// Lifecycle event kinds dispatch emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    BeadCreated,
    BeadAssigned,
    BeadStatusChange(BeadStatus),
    BeadCompleted,
    DecisionCreated,
    DecisionResolved,
    ProviderRegistered,
    ProviderUpdated,
    ProviderDeleted,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
}

/// A single emitted event.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub bead_id: Option<BeadId>,
    pub agent_id: Option<AgentId>,
    pub provider_id: Option<ProviderId>,
    pub decision_id: Option<DecisionId>,
    pub project_id: String,
    pub data: HashMap<String, String>,
}

impl Event {
    pub fn bead(kind: EventKind, bead_id: BeadId, project_id: impl Into<String>, data: HashMap<String, String>) -> Self {
        Self { kind, bead_id: Some(bead_id), agent_id: None, provider_id: None, decision_id: None, project_id: project_id.into(), data }
    }
}

#[async_trait]
pub trait EventBus: Send + Sync + 'static {
    async fn publish(&self, event: Event) -> Result<(), EventBusError>;

    async fn publish_bead_event(
        &self,
        kind: EventKind,
        bead_id: BeadId,
        project_id: &str,
        data: HashMap<String, String>,
    ) -> Result<(), EventBusError> {
        self.publish(Event::bead(kind, bead_id, project_id, data)).await
    }
}

/// Reference bus that records every published event, in order. Suitable
/// both as a production default and as the backbone for test assertions
/// on event ordering.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: parking_lot::Mutex<Vec<Event>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|e| e.kind.clone()).collect()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: Event) -> Result<(), EventBusError> {
        tracing::debug!(kind = ?event.kind, bead = ?event.bead_id, "publishing event");
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
