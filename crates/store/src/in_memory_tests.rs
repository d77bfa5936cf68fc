// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ralph_core::test_support::{active_provider, idle_agent, ready_task};
use ralph_core::BeadType;

#[tokio::test]
async fn list_ready_excludes_decisions_and_other_projects() {
    let store = InMemoryBeadStore::new();
    let task = ready_task("proj-a");
    let task_id = task.id;
    store.insert(task);
    store.insert(ralph_core::Bead::builder().project("proj-a").bead_type(BeadType::Decision).build());
    store.insert(ready_task("proj-b"));

    let ready = store.list_ready("proj-a").await.unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, task_id);
}

#[tokio::test]
async fn claim_assigns_unclaimed_bead() {
    let store = InMemoryBeadStore::new();
    let bead = ready_task("proj-a");
    let bead_id = bead.id;
    store.insert(bead);
    let agent_id = AgentId::from("agt-1");

    store.claim(&bead_id, &agent_id).await.unwrap();
    assert_eq!(store.snapshot(&bead_id).unwrap().assigned_to, Some(agent_id));
}

#[tokio::test]
async fn claim_conflicts_when_already_assigned_elsewhere() {
    let store = InMemoryBeadStore::new();
    let bead = ready_task("proj-a");
    let bead_id = bead.id;
    store.insert(bead);
    store.claim(&bead_id, &AgentId::from("agt-1")).await.unwrap();

    let err = store.claim(&bead_id, &AgentId::from("agt-2")).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyClaimed { .. }));
}

#[tokio::test]
async fn update_applies_only_set_fields() {
    let store = InMemoryBeadStore::new();
    let bead = ready_task("proj-a");
    let bead_id = bead.id;
    let original_title = bead.title.clone();
    store.insert(bead);

    store.update(&bead_id, BeadUpdate::new().status(BeadStatus::InProgress)).await.unwrap();
    let updated = store.snapshot(&bead_id).unwrap();
    assert_eq!(updated.status, BeadStatus::InProgress);
    assert_eq!(updated.title, original_title);
}

#[tokio::test]
async fn assign_bead_transitions_agent_to_working() {
    let agent_store = InMemoryAgentStore::new();
    let agent = idle_agent("proj-a");
    let agent_id = agent.id.clone();
    agent_store.insert(agent);
    let bead_id = BeadId::new();

    agent_store.assign_bead(&agent_id, &bead_id).await.unwrap();
    let updated = agent_store.snapshot(&agent_id).unwrap();
    assert_eq!(updated.status, AgentStatus::Working);
    assert_eq!(updated.current_bead, Some(bead_id));
}

#[tokio::test]
async fn get_idle_by_project_filters_working_agents() {
    let agent_store = InMemoryAgentStore::new();
    agent_store.insert(idle_agent("proj-a"));
    agent_store.insert(ralph_core::test_support::working_agent("proj-a", BeadId::new()));

    let idle = agent_store.get_idle_by_project("proj-a").await.unwrap();
    assert_eq!(idle.len(), 1);
}

#[tokio::test]
async fn provider_registry_lists_only_active() {
    let registry = InMemoryProviderRegistry::new();
    let provider = active_provider();
    let provider_id = provider.id;
    registry.upsert(provider).await.unwrap();
    registry.upsert(ralph_core::test_support::inactive_provider()).await.unwrap();

    let active = registry.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, provider_id);
}
