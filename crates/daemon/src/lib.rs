// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ralph-daemon: the ambient stack around `ralph-dispatch` — config
//! loading, logging setup, and the two background loops spec §5 assigns
//! to the daemon process (the fallback dispatch loop and the maintenance
//! loop). Persistence, the HTTP/CLI façade, and the LLM provider clients
//! themselves stay out of scope (spec §1); this crate wires the
//! in-memory reference stores from `ralph-store` by default so the
//! dispatch core runs standalone, with room for a real backend to slot
//! in behind the same trait objects later.

pub mod config;
pub mod error;
pub mod logging;
pub mod supervisor;

pub use config::Config;
pub use error::{DaemonError, DaemonResult};
pub use supervisor::Supervisor;

use ralph_adapters::{InMemoryEventBus, NoWorker, NoWorkflowEngine};
use ralph_core::SystemClock;
use ralph_dispatch::Dispatcher;
use ralph_store::{InMemoryAgentStore, InMemoryBeadStore, InMemoryProviderRegistry};
use std::sync::Arc;

/// Everything the daemon hands off to the supervisor: the dispatcher and
/// the stores it was built against, kept alongside it so a caller (tests,
/// or a future persistence-backed `main`) can seed state before the
/// background loops start pulling from it.
pub struct Handle {
    pub dispatcher: Arc<Dispatcher<SystemClock>>,
    pub bead_store: Arc<InMemoryBeadStore>,
    pub agent_store: Arc<InMemoryAgentStore>,
    pub provider_registry: Arc<InMemoryProviderRegistry>,
    pub supervisor: Supervisor,
}

/// Build a dispatcher over the in-memory reference stores with no
/// message bus, no workflow engine, no git operator, and no escalator —
/// the "everything nil, graceful degradation" configuration spec §9
/// describes as the baseline every capability interface can fall back
/// to. With no bus configured, dispatch runs in legacy inline mode
/// (spec §4.4): `NoWorker` is wired in by default, which fails each
/// task immediately with a clear error rather than silently leaving the
/// bead assigned forever — a caller that wants real inline execution
/// supplies its own `Worker` by constructing a `Dispatcher` directly.
pub fn build(config: &Config) -> Handle {
    let bead_store = Arc::new(InMemoryBeadStore::new());
    let agent_store = Arc::new(InMemoryAgentStore::new());
    let provider_registry = Arc::new(InMemoryProviderRegistry::new());
    let event_bus = Arc::new(InMemoryEventBus::new());
    let dispatch_config = config.dispatch_config();

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&bead_store) as Arc<dyn ralph_store::BeadStore>,
        Arc::clone(&agent_store) as Arc<dyn ralph_store::AgentStore>,
        Arc::clone(&provider_registry) as Arc<dyn ralph_store::ProviderRegistry>,
        None,
        event_bus as Arc<dyn ralph_adapters::EventBus>,
        Some(Arc::new(NoWorkflowEngine) as Arc<dyn ralph_adapters::WorkflowEngine>),
        Some(Arc::new(NoWorker) as Arc<dyn ralph_adapters::Worker>),
        None,
        None,
        dispatch_config.clone(),
        SystemClock,
    ));

    dispatcher.result_handler.spawn_reaper(SystemClock);

    let supervisor = Supervisor::new(Arc::clone(&dispatcher), config.projects.clone(), &dispatch_config);

    Handle { dispatcher, bead_store, agent_store, provider_registry, supervisor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_produces_a_dispatcher_that_parks_with_no_providers() {
        let handle = build(&Config::default());
        let outcome = handle.dispatcher.dispatch_once("").await;
        assert!(!outcome.dispatched);
        assert_eq!(outcome.error.as_deref(), Some("no active providers"));
    }
}
