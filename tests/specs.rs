// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end dispatch-cycle scenarios, pinned to the concrete
//! inputs/outputs spec.md §8 names: happy-path dispatch with ordered
//! events, provider-error recovery, ABABAB alternation escalation, the
//! hard dispatch limit, "completed" winning over alternation
//! detection, and stuck-exploration detection.

#![allow(clippy::unwrap_used)]

use ralph_adapters::{EventKind, FakeMessageBus, InMemoryEventBus, NoWorkflowEngine};
use ralph_core::context;
use ralph_core::test_support::{active_provider, fixed_agent_id, fixed_provider_id, idle_agent, ready_task};
use ralph_core::{BeadStatus, FakeClock, Priority};
use ralph_dispatch::{Dispatcher, DispatchConfig, FailureReport, LoopTerminalReason, SuccessReport};
use ralph_store::{AgentStore, BeadStore, InMemoryAgentStore, InMemoryBeadStore, InMemoryProviderRegistry, ProviderRegistry};
use std::sync::Arc;

fn wired(
    bead_store: &Arc<InMemoryBeadStore>,
    agent_store: &Arc<InMemoryAgentStore>,
    provider_registry: &Arc<InMemoryProviderRegistry>,
    event_bus: &Arc<InMemoryEventBus>,
    config: DispatchConfig,
    clock: FakeClock,
) -> Dispatcher<FakeClock> {
    Dispatcher::new(
        Arc::clone(bead_store) as Arc<dyn BeadStore>,
        Arc::clone(agent_store) as Arc<dyn AgentStore>,
        Arc::clone(provider_registry) as Arc<dyn ProviderRegistry>,
        Some(Arc::new(FakeMessageBus::new()) as Arc<dyn ralph_adapters::MessageBus>),
        Arc::clone(event_bus) as Arc<dyn ralph_adapters::EventBus>,
        Some(Arc::new(NoWorkflowEngine) as Arc<dyn ralph_adapters::WorkflowEngine>),
        None,
        None,
        None,
        config,
        clock,
    )
}

/// Happy path: a ready bead dispatches to an idle, provider-backed
/// agent, and the assigned event precedes the in-progress status event
/// (spec §5's ordering guarantee).
#[tokio::test]
async fn happy_path_dispatches_and_orders_events_correctly() {
    let bead_store = Arc::new(InMemoryBeadStore::new());
    let agent_store = Arc::new(InMemoryAgentStore::new());
    let provider_registry = Arc::new(InMemoryProviderRegistry::new());
    let event_bus = Arc::new(InMemoryEventBus::new());

    let provider = active_provider();
    provider_registry.upsert(provider.clone()).await.unwrap();
    let mut agent = idle_agent("proj-a");
    agent.provider_id = provider.id;
    agent_store.insert(agent);
    let bead = ready_task("proj-a");
    let bead_id = bead.id;
    bead_store.insert(bead);

    let dispatcher = wired(&bead_store, &agent_store, &provider_registry, &event_bus, DispatchConfig::default(), FakeClock::new());
    let outcome = dispatcher.dispatch_once("proj-a").await;

    assert!(outcome.dispatched);
    assert_eq!(outcome.bead_id, Some(bead_id));

    let kinds = event_bus.kinds();
    let assigned_idx = kinds.iter().position(|k| *k == EventKind::BeadAssigned).expect("assigned event");
    let in_progress_idx = kinds
        .iter()
        .position(|k| *k == EventKind::BeadStatusChange(BeadStatus::InProgress))
        .expect("in-progress status event");
    assert!(assigned_idx < in_progress_idx, "bead.assigned must precede bead.status_change(in_progress)");
}

/// A provider 502 resets the bead to open/unassigned without touching
/// loop metadata — no dispatch-history entry, no error-history entry,
/// no remediation (spec §4.6, §7).
#[tokio::test]
async fn provider_error_resets_without_polluting_loop_state() {
    let bead_store = Arc::new(InMemoryBeadStore::new());
    let mut bead = ready_task("proj-a");
    bead.status = BeadStatus::InProgress;
    bead.assigned_to = Some(fixed_agent_id("1"));
    let bead_id = bead.id;
    bead_store.insert(bead);

    let dispatcher = wired(
        &bead_store,
        &Arc::new(InMemoryAgentStore::new()),
        &Arc::new(InMemoryProviderRegistry::new()),
        &Arc::new(InMemoryEventBus::new()),
        DispatchConfig::default(),
        FakeClock::new(),
    );

    let report = FailureReport { agent_id: fixed_agent_id("1"), error_message: "status code 502".to_string() };
    dispatcher.apply_failure(&bead_id, report).await.unwrap();

    let persisted = bead_store.snapshot(&bead_id).unwrap();
    assert_eq!(persisted.status, BeadStatus::Open);
    assert_eq!(persisted.assigned_to, None);
    assert!(context::get_json_list::<String>(&persisted.context, context::DISPATCH_HISTORY).is_empty());
    assert!(!context::get_bool(&persisted.context, context::LOOP_DETECTED));
    assert!(!context::get_bool(&persisted.context, context::REMEDIATION_NEEDED));
}

/// Six consecutive failures alternating between exactly two agents
/// trips alternation detection: the bead goes P0/open/unassigned and
/// carries a `loop_detected_reason` (spec §4.5/§4.8).
#[tokio::test]
async fn abab_alternation_escalates_to_open_unassigned_p0() {
    let bead_store = Arc::new(InMemoryBeadStore::new());
    let mut bead = ready_task("proj-a");
    bead.status = BeadStatus::InProgress;
    let bead_id = bead.id;
    bead_store.insert(bead);

    let dispatcher = wired(
        &bead_store,
        &Arc::new(InMemoryAgentStore::new()),
        &Arc::new(InMemoryProviderRegistry::new()),
        &Arc::new(InMemoryEventBus::new()),
        DispatchConfig::default(),
        FakeClock::new(),
    );

    let agent_a = fixed_agent_id("a");
    let agent_b = fixed_agent_id("b");
    let sequence = [&agent_a, &agent_b, &agent_a, &agent_b, &agent_a, &agent_b];
    for agent_id in sequence {
        let report = FailureReport { agent_id: agent_id.clone(), error_message: "agent gave up".to_string() };
        dispatcher.apply_failure(&bead_id, report).await.unwrap();
    }

    let persisted = bead_store.snapshot(&bead_id).unwrap();
    assert_eq!(persisted.status, BeadStatus::Open);
    assert_eq!(persisted.assigned_to, None);
    assert_eq!(persisted.priority, Priority::P0);
    assert!(context::get_bool(&persisted.context, context::LOOP_DETECTED));
    assert!(context::get_string(&persisted.context, context::LOOP_DETECTED_REASON).is_some());
}

/// A bead that has exhausted its hop limit and is judged stuck gets
/// ralph-blocked with `ralph_blocked_reason` set and reassigned to a
/// triage agent (spec §4.2.1/§4.2.2).
#[tokio::test]
async fn hard_dispatch_limit_blocks_with_reason_and_triage_reassignment() {
    let bead_store = Arc::new(InMemoryBeadStore::new());
    let agent_store = Arc::new(InMemoryAgentStore::new());
    let provider_registry = Arc::new(InMemoryProviderRegistry::new());
    let event_bus = Arc::new(InMemoryEventBus::new());

    let provider = active_provider();
    provider_registry.upsert(provider.clone()).await.unwrap();
    let mut triage = ralph_core::Agent::builder().role("engineering-manager").project_id("proj-a").status(ralph_core::AgentStatus::Idle).build();
    triage.provider_id = provider.id;
    agent_store.insert(triage.clone());

    let mut bead = ready_task("proj-a");
    let config = DispatchConfig::default();
    context::set_u32(&mut bead.context, context::DISPATCH_COUNT, config.hard_dispatch_limit());
    let bead_id = bead.id;
    bead_store.insert(bead);

    let dispatcher = wired(&bead_store, &agent_store, &provider_registry, &event_bus, config, FakeClock::new());
    let outcome = dispatcher.dispatch_once("proj-a").await;

    assert!(!outcome.dispatched);
    let persisted = bead_store.snapshot(&bead_id).unwrap();
    assert_eq!(persisted.status, BeadStatus::Blocked);
    assert_eq!(persisted.assigned_to, Some(triage.id));
    assert_eq!(context::get_string(&persisted.context, context::RALPH_BLOCKED_REASON), Some("hard_dispatch_limit_exceeded"));
}

/// A "completed" result closes the bead and skips alternation detection
/// entirely, even if the agent history would otherwise read as ABABAB
/// (spec §4.5: terminal completion takes precedence).
#[tokio::test]
async fn completed_result_wins_over_alternation_detection() {
    let bead_store = Arc::new(InMemoryBeadStore::new());
    let mut bead = ready_task("proj-a");
    bead.status = BeadStatus::InProgress;
    bead.assigned_to = Some(fixed_agent_id("a"));

    let agent_a = fixed_agent_id("a");
    let agent_b = fixed_agent_id("b");
    context::set_json_list(&mut bead.context, context::DISPATCH_HISTORY, &[agent_a.as_str(), agent_b.as_str(), agent_a.as_str(), agent_b.as_str(), agent_a.as_str()]);
    let bead_id = bead.id;
    bead_store.insert(bead);

    let dispatcher = wired(
        &bead_store,
        &Arc::new(InMemoryAgentStore::new()),
        &Arc::new(InMemoryProviderRegistry::new()),
        &Arc::new(InMemoryEventBus::new()),
        DispatchConfig::default(),
        FakeClock::new(),
    );

    let report = SuccessReport {
        agent_id: agent_b.clone(),
        provider_id: fixed_provider_id("1"),
        provider_model: "gpt".to_string(),
        agent_output: "done".to_string(),
        agent_tokens: 42,
        agent_task_id: "task-1".to_string(),
        agent_worker_id: "worker-1".to_string(),
        loop_terminal_reason: Some(LoopTerminalReason::Completed),
    };
    dispatcher.apply_success(&bead_id, report).await.unwrap();

    let persisted = bead_store.snapshot(&bead_id).unwrap();
    assert_eq!(persisted.status, BeadStatus::Closed);
    assert_eq!(persisted.assigned_to, None);
    assert!(!context::get_bool(&persisted.context, context::LOOP_DETECTED));
    assert_eq!(context::get_string(&persisted.context, context::TERMINAL_REASON), Some("completed"));
}

/// Seven consecutive `read_file` actions on the same target with no
/// mutation in between trip non-productive-repetition detection, and
/// the suggested next steps call out the read-without-edit pattern
/// (spec §4.8).
#[test]
fn stuck_exploration_is_detected_from_repeated_read_actions() {
    use ralph_dispatch::{is_stuck_in_loop, record_action, ActionRecord, ActionType};

    let mut ctx = context::Context::new();
    for i in 0..7 {
        record_action(&mut ctx, ActionRecord { action_type: ActionType::ReadFile, target: "src/lib.rs".to_string(), at_ms: i * 1000 });
    }

    let reason = is_stuck_in_loop(&ctx, 5, 3, 10 * 60 * 1000);
    assert!(reason.is_some());
    assert_eq!(reason.unwrap().message(), "Repeated action pattern with no recent progress");
}
