// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher (spec §4.1): orchestrates one dispatch cycle — readiness,
//! select, claim, publish — and the two post-processing paths a result
//! can later take (§4.5 success, §4.6 failure).
//!
//! `dispatch_once` ends at task publication. The actual worker run
//! happens out of process when a message bus is configured (a bus
//! consumer reports back later); with no bus configured, the injected
//! `Worker` runs it inline instead (spec §4.4 legacy mode). Either way
//! the result comes back through [`Dispatcher::apply_success`] /
//! [`Dispatcher::apply_failure`], correlated by the
//! [`crate::result_handler::ResultHandler`] this dispatcher owns.

use crate::commit_serializer::CommitSerializer;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::result_handler::{PendingTask, ResultHandler};
use crate::roles;
use crate::selector::{self, SelectorInput, SelectorOutcome, WorkflowGate};
use async_trait::async_trait;
use parking_lot::Mutex;
use ralph_adapters::{
    EscalationNotice, Escalator, EventBus, EventKind, ExecutionState, GitOperator, MessageBus, TaskMessage, Worker, WorkerTask,
    WorkflowEngine,
};
use ralph_core::{context, Agent, AgentId, AgentStatus, Bead, BeadId, BeadStatus, BeadType, Clock, Decision, DecisionOption, DecisionSource, Priority, ProviderId};
use ralph_store::{AgentStore, BeadStore, BeadUpdate, ProviderRegistry};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A project-level gate consulted before dispatch proceeds (spec §4.1
/// step 2). `Block` mode aborts the cycle on failure; `Warn` mode only
/// logs.
#[async_trait]
pub trait ReadinessCheck: Send + Sync + 'static {
    async fn check(&self, project: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessMode {
    Block,
    Warn,
}

/// `DispatchOnce`'s return value (spec §4.1).
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub dispatched: bool,
    pub project_id: String,
    pub bead_id: Option<BeadId>,
    pub agent_id: Option<AgentId>,
    pub provider_id: Option<ProviderId>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn parked(project_id: &str, reason: impl Into<String>) -> Self {
        Self { dispatched: false, project_id: project_id.to_string(), error: Some(reason.into()), ..Default::default() }
    }

    fn dispatched(project_id: &str, bead_id: BeadId, agent_id: AgentId, provider_id: ProviderId) -> Self {
        Self {
            dispatched: true,
            project_id: project_id.to_string(),
            bead_id: Some(bead_id),
            agent_id: Some(agent_id),
            provider_id: Some(provider_id),
            error: None,
        }
    }
}

/// `result.LoopTerminalReason` (spec §4.5's table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTerminalReason {
    Completed,
    MaxIterations,
    ParseFailures,
    ValidationFailures,
    Error,
    ProgressStagnant,
    InnerLoop,
}

/// A successful worker result, ready for post-processing (spec §4.5).
#[derive(Debug, Clone)]
pub struct SuccessReport {
    pub agent_id: AgentId,
    pub provider_id: ProviderId,
    pub provider_model: String,
    pub agent_output: String,
    pub agent_tokens: u64,
    pub agent_task_id: String,
    pub agent_worker_id: String,
    pub loop_terminal_reason: Option<LoopTerminalReason>,
}

/// A failed worker result (spec §4.6).
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub agent_id: AgentId,
    pub error_message: String,
}

const PROVIDER_ERROR_SIGNATURES: &[&str] = &[
    "connection refused",
    "context canceled",
    "context deadline exceeded",
    "dial tcp",
    "no such host",
    "i/o timeout",
    "status code 401",
    "status code 403",
    "status code 429",
    "status code 500",
    "status code 502",
    "status code 503",
    "status code 504",
    "502 all providers failed",
    "429 budget exceeded",
    "authorization required",
    "rate limit",
    "quota exceeded",
];

fn is_provider_error(message: &str) -> bool {
    PROVIDER_ERROR_SIGNATURES.iter().any(|sig| message.contains(sig))
}

/// Orchestrates the dispatch cycle. Holds no persistent state of its
/// own beyond the in-flight set, the result handler, and the commit
/// queue (spec §3 "Ownership"); everything else is mutated through the
/// store interfaces.
pub struct Dispatcher<C: Clock> {
    bead_store: Arc<dyn BeadStore>,
    agent_store: Arc<dyn AgentStore>,
    provider_registry: Arc<dyn ProviderRegistry>,
    message_bus: Option<Arc<dyn MessageBus>>,
    event_bus: Arc<dyn EventBus>,
    workflow_engine: Option<Arc<dyn WorkflowEngine>>,
    worker: Option<Arc<dyn Worker>>,
    git_operator: Option<Arc<dyn GitOperator>>,
    escalator: Option<Arc<dyn Escalator>>,
    readiness: Option<(Arc<dyn ReadinessCheck>, ReadinessMode)>,
    config: DispatchConfig,
    clock: C,
    inflight: Mutex<HashSet<BeadId>>,
    pub result_handler: Arc<ResultHandler>,
    pub commit_serializer: Arc<CommitSerializer>,
}

impl<C: Clock> Dispatcher<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bead_store: Arc<dyn BeadStore>,
        agent_store: Arc<dyn AgentStore>,
        provider_registry: Arc<dyn ProviderRegistry>,
        message_bus: Option<Arc<dyn MessageBus>>,
        event_bus: Arc<dyn EventBus>,
        workflow_engine: Option<Arc<dyn WorkflowEngine>>,
        worker: Option<Arc<dyn Worker>>,
        git_operator: Option<Arc<dyn GitOperator>>,
        escalator: Option<Arc<dyn Escalator>>,
        config: DispatchConfig,
        clock: C,
    ) -> Self {
        let commit_timeout = config.commit_lock_timeout;
        Self {
            bead_store,
            agent_store,
            provider_registry,
            message_bus,
            event_bus,
            workflow_engine,
            worker,
            git_operator,
            escalator,
            readiness: None,
            config,
            clock,
            inflight: Mutex::new(HashSet::new()),
            result_handler: ResultHandler::new(),
            commit_serializer: CommitSerializer::new(commit_timeout),
        }
    }

    pub fn with_readiness_check(mut self, check: Arc<dyn ReadinessCheck>, mode: ReadinessMode) -> Self {
        self.readiness = Some((check, mode));
        self
    }

    /// `DispatchOnce(projectID)` (spec §4.1, steps 1–10). Ends at task
    /// publication; the result comes back through `apply_success` /
    /// `apply_failure`.
    pub async fn dispatch_once(&self, project: &str) -> DispatchOutcome {
        match self.dispatch_once_inner(project).await {
            Ok(outcome) => outcome,
            Err(err) => DispatchOutcome::parked(project, err.to_string()),
        }
    }

    async fn dispatch_once_inner(&self, project: &str) -> DispatchResult<DispatchOutcome> {
        // Step 1: provider guard.
        let active_providers = self.provider_registry.list_active().await?;
        if active_providers.is_empty() {
            tracing::warn!(project, "no active providers; parking dispatch");
            return Ok(DispatchOutcome::parked(project, "no active providers"));
        }

        // Step 2: readiness check.
        if let Some((check, mode)) = &self.readiness {
            if let Err(reason) = check.check(project).await {
                match mode {
                    ReadinessMode::Block => return Ok(DispatchOutcome::parked(project, reason)),
                    ReadinessMode::Warn => tracing::warn!(project, %reason, "readiness check failed (warn mode); continuing"),
                }
            }
        }

        // Step 3 + 4: fetch ready beads, sort.
        let mut ready = self.bead_store.list_ready(project).await?;
        selector::sort_ready_beads(&mut ready);

        // Step 5 + 6: idle-agent filter (promoting paused agents whose
        // provider is now active), plus the full project agent roster.
        let all_agents = self.agent_store.list_by_project(project).await?;
        let idle_agents = self.resolve_idle_agents(project, &all_agents).await?;

        // Step 7: selector.
        let inflight_snapshot = self.inflight.lock().clone();
        let now_ms = self.clock.epoch_ms();
        let mut selected: Option<(Bead, AgentId)> = None;

        for mut bead in ready {
            let workflow_gate = self.resolve_workflow_gate(&bead, &idle_agents).await;
            let input = SelectorInput {
                idle_agents: &idle_agents,
                project_agents: &all_agents,
                all_agents: &all_agents,
                inflight: &inflight_snapshot,
                config: &self.config,
                now_ms,
                workflow_gate,
            };
            let outcome = selector::evaluate(&mut bead, &input);
            self.persist_selector_state(&bead).await?;

            match outcome {
                SelectorOutcome::Matched(agent_id) => {
                    selected = Some((bead, agent_id));
                    break;
                }
                SelectorOutcome::Blocked => {
                    self.event_bus
                        .publish_bead_event(EventKind::BeadStatusChange(BeadStatus::Blocked), bead.id, project, HashMap::new())
                        .await?;
                    tracing::info!(bead_id = %bead.id, "ralph-blocked after selector evaluation");
                }
                SelectorOutcome::Skip(reason) => {
                    tracing::debug!(bead_id = %bead.id, reason = reason.counter_key(), "selector skip");
                }
            }
        }

        let Some((bead, agent_id)) = selected else {
            return Ok(DispatchOutcome::parked(project, "no ready bead matched an idle agent"));
        };

        self.inflight.lock().insert(bead.id);

        // idle_agents may carry a freshly-promoted paused-to-idle clone for this
        // id; prefer it over the stale entry still sitting in all_agents.
        let agent = idle_agents
            .iter()
            .chain(all_agents.iter())
            .find(|a| a.id == agent_id)
            .cloned()
            .ok_or_else(|| DispatchError::Store(ralph_store::StoreError::AgentNotFound(agent_id.clone())))?;

        // Step 8: provider-for-task.
        let provider_id = if active_providers.iter().any(|p| p.id == agent.provider_id) {
            agent.provider_id.clone()
        } else {
            active_providers[0].id.clone()
        };

        // Step 9: claim & assign.
        if let Err(err) = self.claim_and_assign(&bead, &agent_id).await {
            self.inflight.lock().remove(&bead.id);
            return Err(err);
        }

        // Step 10: task publication.
        self.publish_task(project, &bead, &agent, &provider_id).await?;

        Ok(DispatchOutcome::dispatched(project, bead.id, agent_id, provider_id))
    }

    async fn resolve_idle_agents(&self, project: &str, all_agents: &[Agent]) -> DispatchResult<Vec<Agent>> {
        let mut idle = Vec::new();
        for agent in self.agent_store.get_idle_by_project(project).await? {
            if self.provider_registry.is_active(&agent.provider_id).await.unwrap_or(false) {
                idle.push(agent);
            }
        }
        for agent in all_agents.iter().filter(|a| a.status == AgentStatus::Paused) {
            if self.provider_registry.is_active(&agent.provider_id).await.unwrap_or(false) {
                self.agent_store.restore_agent(&agent.id).await?;
                let mut promoted = agent.clone();
                promoted.status = AgentStatus::Idle;
                idle.push(promoted);
            }
        }
        Ok(idle)
    }

    async fn resolve_workflow_gate(&self, bead: &Bead, idle_agents: &[Agent]) -> Option<WorkflowGate> {
        let gated = bead.has_tag(context::WORKFLOW_REQUIRED_TAG) || bead.has_tag(context::STRICT_WORKFLOW_TAG);
        if !gated {
            return None;
        }
        let engine = self.workflow_engine.as_ref()?;
        let execution = engine.get_execution_by_bead(&bead.id).await?;
        let ready = engine.is_node_ready(&execution.execution_id).await;
        let role_matches = idle_agents.iter().any(|a| roles::infer_agent_role(a, bead).is_some());
        Some(WorkflowGate { required_role_matches_idle_agent: ready && role_matches })
    }

    /// Persist the ambient mutations the selector may have applied —
    /// auto-bug rewrite, auto-enable-redispatch, dead-agent clearing,
    /// `ralphAutoBlock` — regardless of the skip/match/block outcome.
    async fn persist_selector_state(&self, bead: &Bead) -> DispatchResult<()> {
        let mut patch = BeadUpdate::new().title(bead.title.clone()).context(bead.context.clone()).assigned_to(bead.assigned_to.clone());
        if bead.status == BeadStatus::Blocked {
            patch = patch.status(BeadStatus::Blocked);
        }
        self.bead_store.update(&bead.id, patch).await?;
        Ok(())
    }

    async fn claim_and_assign(&self, bead: &Bead, agent_id: &AgentId) -> DispatchResult<()> {
        match &bead.assigned_to {
            None => self.bead_store.claim(&bead.id, agent_id).await?,
            Some(current) if current == agent_id => {}
            Some(current) => self.bead_store.reassign(&bead.id, agent_id, Some(current)).await?,
        }

        let mut context = bead.context.clone();
        let dispatch_count = context::get_u32(&context, context::DISPATCH_COUNT) + 1;
        context::set_u32(&mut context, context::DISPATCH_COUNT, dispatch_count);

        self.bead_store
            .update(
                &bead.id,
                BeadUpdate::new().context(context).assigned_to(Some(agent_id.clone())).status(BeadStatus::InProgress),
            )
            .await?;
        self.agent_store.assign_bead(agent_id, &bead.id).await?;
        Ok(())
    }

    async fn publish_task(&self, project: &str, bead: &Bead, agent: &Agent, provider_id: &ProviderId) -> DispatchResult<()> {
        self.event_bus.publish_bead_event(EventKind::BeadAssigned, bead.id, project, HashMap::new()).await?;
        self.event_bus
            .publish_bead_event(EventKind::BeadStatusChange(BeadStatus::InProgress), bead.id, project, HashMap::new())
            .await?;

        match &self.message_bus {
            Some(bus) => {
                let role = roles::infer_agent_role(agent, bead);
                let correlation_id = format!("dispatch-{}-{}", bead.id, nanoid::nanoid!(10));
                let msg = TaskMessage {
                    correlation_id: correlation_id.clone(),
                    bead_id: bead.id,
                    project_id: project.to_string(),
                    agent_id: agent.id.clone(),
                    payload: bead.title.clone(),
                };
                match role {
                    Some(role) => bus.publish_task_for_role(project, role.as_str(), msg).await?,
                    None => bus.publish_task(project, msg).await?,
                }
                let now_ms = self.clock.epoch_ms();
                self.result_handler.track(
                    correlation_id,
                    PendingTask {
                        project: project.to_string(),
                        bead_id: bead.id,
                        agent_id: agent.id.clone(),
                        role: role.map(|r| r.as_str().to_string()).unwrap_or_default(),
                        registered_at_ms: now_ms,
                        last_update_ms: now_ms,
                    },
                );
            }
            None => match &self.worker {
                Some(worker) => {
                    tracing::debug!(bead_id = %bead.id, agent_id = %agent.id, provider_id = %provider_id, "no message bus configured; executing inline (legacy mode)");
                    let correlation_id = format!("inline-{}-{}", bead.id, nanoid::nanoid!(10));
                    let task = WorkerTask {
                        correlation_id,
                        bead_id: bead.id,
                        project_id: project.to_string(),
                        agent_id: agent.id.clone(),
                        payload: bead.title.clone(),
                    };
                    match worker.execute(task).await {
                        Ok(success) => {
                            let report = SuccessReport {
                                agent_id: agent.id.clone(),
                                provider_id: provider_id.clone(),
                                provider_model: success.provider_model,
                                agent_output: success.agent_output,
                                agent_tokens: success.agent_tokens,
                                agent_task_id: success.agent_task_id,
                                agent_worker_id: success.agent_worker_id,
                                loop_terminal_reason: None,
                            };
                            self.apply_success(&bead.id, report).await?;
                        }
                        Err(failure) => {
                            let report = FailureReport { agent_id: agent.id.clone(), error_message: failure.error_message };
                            self.apply_failure(&bead.id, report).await?;
                        }
                    }
                }
                None => {
                    tracing::warn!(
                        bead_id = %bead.id,
                        agent_id = %agent.id,
                        provider_id = %provider_id,
                        "no message bus or inline worker configured; bead will not progress further"
                    );
                }
            },
        }
        Ok(())
    }

    /// Success post-processing (spec §4.5).
    pub async fn apply_success(&self, bead_id: &BeadId, report: SuccessReport) -> DispatchResult<()> {
        let mut bead = self.bead_store.get(bead_id).await?;
        self.inflight.lock().remove(bead_id);

        context::set_u64(&mut bead.context, context::LAST_RUN_AT, self.clock.epoch_ms());
        context::set_string(&mut bead.context, context::AGENT_ID, report.agent_id.as_str());
        context::set_string(&mut bead.context, context::PROVIDER_ID, report.provider_id.as_str());
        context::set_string(&mut bead.context, context::PROVIDER_MODEL, &report.provider_model);
        context::set_string(&mut bead.context, context::AGENT_OUTPUT, &report.agent_output);
        context::set_u32(&mut bead.context, context::AGENT_TOKENS, report.agent_tokens as u32);
        context::set_string(&mut bead.context, context::AGENT_TASK_ID, &report.agent_task_id);
        context::set_string(&mut bead.context, context::AGENT_WORKER_ID, &report.agent_worker_id);
        context::set_bool(&mut bead.context, context::REDISPATCH_REQUESTED, true);

        let mut clear_assignment = false;
        let mut spawn_remediation = false;

        match report.loop_terminal_reason {
            Some(LoopTerminalReason::Completed) => {
                bead.status = BeadStatus::Closed;
                clear_assignment = true;
                context::set_bool(&mut bead.context, context::REDISPATCH_REQUESTED, false);
                context::set_string(&mut bead.context, context::TERMINAL_REASON, "completed");
            }
            Some(LoopTerminalReason::MaxIterations) => {
                if context::get_u32(&bead.context, context::MAX_ITERATIONS_RETRIES) == 0 {
                    context::set_u32(&mut bead.context, context::MAX_ITERATIONS_RETRIES, 1);
                    context::set_bool(&mut bead.context, context::REDISPATCH_REQUESTED, true);
                } else {
                    context::set_bool(&mut bead.context, context::MAX_ITERATIONS_RETRY_EXHAUSTED, true);
                    context::set_bool(&mut bead.context, context::REDISPATCH_REQUESTED, false);
                    context::set_string(&mut bead.context, context::TERMINAL_REASON, "max_iterations");
                }
            }
            Some(LoopTerminalReason::ParseFailures | LoopTerminalReason::ValidationFailures | LoopTerminalReason::Error) => {
                context::set_u64(&mut bead.context, context::LAST_FAILED_AT, self.clock.epoch_ms());
                context::set_bool(&mut bead.context, context::REDISPATCH_REQUESTED, true);
            }
            Some(LoopTerminalReason::ProgressStagnant | LoopTerminalReason::InnerLoop) => {
                context::set_u64(&mut bead.context, context::LAST_FAILED_AT, self.clock.epoch_ms());
                context::set_bool(&mut bead.context, context::REMEDIATION_NEEDED, true);
                context::set_u64(&mut bead.context, context::STUCK_AT, self.clock.epoch_ms());
                bead.status = BeadStatus::Open;
                clear_assignment = true;
                spawn_remediation = true;
            }
            None => {}
        }

        if clear_assignment {
            bead.assigned_to = None;
        }

        let completed = matches!(report.loop_terminal_reason, Some(LoopTerminalReason::Completed));
        let loop_detected = if !completed { self.record_dispatch_history_and_detect_alternation(&mut bead, &report.agent_id) } else { false };

        self.commit_if_configured(&mut bead, &report.agent_id).await?;

        self.bead_store
            .update(
                bead_id,
                BeadUpdate::new()
                    .status(bead.status)
                    .context(bead.context.clone())
                    .assigned_to(bead.assigned_to.clone())
                    .priority(if loop_detected { Priority::P0 } else { bead.priority }),
            )
            .await?;

        let status_kind = match bead.status {
            BeadStatus::Closed => EventKind::BeadCompleted,
            other => EventKind::BeadStatusChange(other),
        };
        self.event_bus.publish_bead_event(status_kind, *bead_id, &bead.project, HashMap::new()).await?;

        if spawn_remediation {
            tracing::info!(bead_id = %bead_id, "spawning remediation bead for stagnant progress");
        }

        if !loop_detected && !completed {
            self.advance_workflow(&bead, true).await?;
        }

        Ok(())
    }

    /// Failure post-processing (spec §4.6).
    pub async fn apply_failure(&self, bead_id: &BeadId, report: FailureReport) -> DispatchResult<()> {
        let mut bead = self.bead_store.get(bead_id).await?;
        self.inflight.lock().remove(bead_id);

        if is_provider_error(&report.error_message) {
            bead.status = BeadStatus::Open;
            bead.assigned_to = None;
            self.bead_store
                .update(bead_id, BeadUpdate::new().status(BeadStatus::Open).assigned_to(None))
                .await?;
            self.event_bus
                .publish_bead_event(EventKind::BeadStatusChange(BeadStatus::Open), *bead_id, &bead.project, HashMap::new())
                .await?;
            tracing::warn!(bead_id = %bead_id, error = %report.error_message, "provider error; reset to open without loop metadata");
            return Ok(());
        }

        context::set_string(&mut bead.context, context::LAST_RUN_ERROR, &report.error_message);
        let loop_detected = self.record_dispatch_history_and_detect_alternation(&mut bead, &report.agent_id);

        self.bead_store
            .update(
                bead_id,
                BeadUpdate::new()
                    .context(bead.context.clone())
                    .assigned_to(bead.assigned_to.clone())
                    .status(bead.status)
                    .priority(if loop_detected { Priority::P0 } else { bead.priority }),
            )
            .await?;
        self.event_bus.publish_bead_event(EventKind::BeadStatusChange(bead.status), *bead_id, &bead.project, HashMap::new()).await?;

        if !loop_detected {
            self.advance_workflow(&bead, false).await?;
        }
        Ok(())
    }

    /// Appends to `dispatch_history` (cap 20) and applies alternation
    /// detection (spec §4.5): exactly 2 unique IDs, strict ABABAB over
    /// the last 6 entries. On detection, reassigns to triage at P0/open.
    /// Returns whether a loop was detected.
    fn record_dispatch_history_and_detect_alternation(&self, bead: &mut Bead, agent_id: &AgentId) -> bool {
        let history = context::push_bounded_json_list(&mut bead.context, context::DISPATCH_HISTORY, agent_id.as_str().to_string(), 20);
        let last_six: Vec<&String> = history.iter().rev().take(6).collect();

        let is_ababab = last_six.len() == 6 && {
            let unique: HashSet<&String> = last_six.iter().copied().collect();
            unique.len() == 2 && last_six.windows(2).all(|w| w[0] != w[1])
        };

        if !is_ababab {
            return false;
        }

        context::set_bool(&mut bead.context, context::LOOP_DETECTED, true);
        context::set_string(&mut bead.context, context::LOOP_DETECTED_REASON, "dispatch alternated between two agents for 6 runs");
        bead.status = BeadStatus::Open;
        bead.assigned_to = None;
        bead.priority = Priority::P0;
        true
    }

    /// Commit a successful agent's work through the injected
    /// `GitOperator`, serialized against every other agent in the
    /// project via `commit_serializer` (spec §4.9), and record the
    /// resulting SHA so `ralphAutoBlock`'s `revert_status` (spec
    /// §4.2.2) has something to derive from. A no-op when no
    /// `GitOperator` is configured.
    async fn commit_if_configured(&self, bead: &mut Bead, agent_id: &AgentId) -> DispatchResult<()> {
        let Some(git) = &self.git_operator else { return Ok(()) };
        let now_ms = self.clock.epoch_ms();
        let lock = self.commit_serializer.acquire(bead.id, agent_id.clone(), now_ms, std::future::pending()).await?;
        let sha = git.commit(&bead.id, &bead.title).await?;
        lock.release();

        if sha.is_empty() {
            return Ok(());
        }
        if context::get_string(&bead.context, context::FIRST_COMMIT_SHA).is_none() {
            context::set_string(&mut bead.context, context::FIRST_COMMIT_SHA, &sha);
        }
        context::set_string(&mut bead.context, context::LAST_COMMIT_SHA, &sha);
        Ok(())
    }

    /// Advance the workflow engine, if one is configured and the bead
    /// has an execution (spec §4.5/§4.6). `Approval`/`Verify` nodes map
    /// outcomes onto `approved`/`rejected` instead of `success`/`failure`.
    async fn advance_workflow(&self, bead: &Bead, succeeded: bool) -> DispatchResult<()> {
        let Some(engine) = &self.workflow_engine else { return Ok(()) };
        let Some(execution) = engine.get_execution_by_bead(&bead.id).await else { return Ok(()) };

        let condition = execution.current_node.condition_for_outcome(succeeded);
        let state = engine.advance(&execution.execution_id, condition, &bead.context).await?;

        if state == ExecutionState::Escalated {
            self.spawn_ceo_escalation(engine.as_ref(), bead, &execution.execution_id).await?;
        }
        Ok(())
    }

    /// Spawn a CEO decision bead (P0, `decision` type) for a workflow
    /// escalation (spec §4.5, §7.6).
    async fn spawn_ceo_escalation(&self, engine: &dyn WorkflowEngine, bead: &Bead, execution_id: &str) -> DispatchResult<()> {
        let info = engine.escalation_info(execution_id).await?;
        self.create_escalation_decision(bead, DecisionSource::WorkflowEscalation, info.title, info.body, "workflow-escalation")
            .await
    }

    /// Auto-escalate beads the loop detector already flagged (spec §5
    /// maintenance loop: "auto-escalates beads carrying `loop_detected`
    /// that are not yet linked to a CEO decision"). Scoped to ready beads
    /// since a loop-detected bead is reopened (not left in_progress) by
    /// `record_dispatch_history_and_detect_alternation`.
    pub async fn auto_escalate_loop_detected(&self, project: &str) -> DispatchResult<usize> {
        let ready = self.bead_store.list_ready(project).await?;
        let mut escalated = 0;
        for bead in ready {
            if !context::get_bool(&bead.context, context::LOOP_DETECTED) {
                continue;
            }
            if bead.context.contains_key(context::ESCALATED_TO_CEO_DECISION_ID) {
                continue;
            }
            let reason = context::get_string(&bead.context, context::LOOP_DETECTED_REASON).unwrap_or("loop detected").to_string();
            let title = format!("Bead {} appears stuck: {}", bead.id, reason);
            let body = format!("Dispatch history: {:?}", context::get_json_list::<String>(&bead.context, context::DISPATCH_HISTORY));
            self.create_escalation_decision(&bead, DecisionSource::LoopDetected, title, body, "loop-escalation").await?;
            escalated += 1;
        }
        Ok(escalated)
    }

    /// Shared CEO-decision-bead creation: a P0 `decision` bead linked back
    /// to its parent via `escalated_to_ceo_decision_id` (spec §4.1 step 6,
    /// §7.6). `ralphAutoBlock`-style idempotence: if `bead` is already
    /// escalated the caller is expected to have filtered it out, but this
    /// never overwrites an existing link either way.
    async fn create_escalation_decision(
        &self,
        bead: &Bead,
        source: DecisionSource,
        title: String,
        body: String,
        extra_tag: &str,
    ) -> DispatchResult<()> {
        if bead.context.contains_key(context::ESCALATED_TO_CEO_DECISION_ID) {
            return Ok(());
        }

        let decision = Decision::new(ralph_core::DecisionId::new(), bead.id, source, title.clone(), self.clock.epoch_ms());

        let mut decision_bead = Bead::new(BeadId::new(), title, BeadType::Decision, bead.project.clone());
        decision_bead.description = body;
        decision_bead.priority = Priority::P0;
        decision_bead.tags = HashSet::from([extra_tag.to_string(), "ceo-review".to_string(), "urgent".to_string()]);
        decision_bead.context.insert(context::ESCALATED_TO_CEO_DECISION_ID.to_string(), decision.id.to_string());
        self.bead_store.create(decision_bead.clone()).await?;

        let mut parent_context = bead.context.clone();
        parent_context.insert(context::ESCALATED_TO_CEO_DECISION_ID.to_string(), decision.id.to_string());
        self.bead_store.update(&bead.id, BeadUpdate::new().context(parent_context)).await?;

        tracing::warn!(bead_id = %bead.id, decision_id = %decision.id, decision_bead_id = %decision_bead.id, "spawned CEO escalation decision");
        self.event_bus.publish_bead_event(EventKind::DecisionCreated, decision_bead.id, &bead.project, HashMap::new()).await?;

        if let Some(escalator) = &self.escalator {
            let notice = EscalationNotice { decision_id: decision.id, parent_bead: bead.id, title: decision.question.clone(), body: decision_bead.description.clone() };
            if let Err(err) = escalator.notify(notice).await {
                tracing::warn!(bead_id = %bead.id, decision_id = %decision.id, error = %err, "escalation notice failed; decision bead is still the store-of-record");
            }
        }

        Ok(())
    }

    /// Apply a resolved decision to its parent bead (spec §7.6):
    /// `approve→closed`; `deny→open, cleared, annotated`;
    /// `needs_more_info→open, reassigned to original agent, annotated`.
    pub async fn apply_decision_resolution(&self, decision: &Decision, original_agent: Option<&AgentId>) -> DispatchResult<()> {
        let Some(resolution) = decision.resolution else {
            return Ok(());
        };
        let mut patch = BeadUpdate::new();
        match resolution {
            DecisionOption::Approve => {
                patch = patch.status(BeadStatus::Closed).assigned_to(None);
            }
            DecisionOption::Deny => {
                patch = patch.status(BeadStatus::Open).assigned_to(None);
            }
            DecisionOption::NeedsMoreInfo => {
                patch = patch.status(BeadStatus::Open).assigned_to(original_agent.cloned());
            }
        }
        self.bead_store.update(&decision.parent_bead, patch).await?;
        self.event_bus
            .publish_bead_event(EventKind::DecisionResolved, decision.parent_bead, "", HashMap::new())
            .await?;
        Ok(())
    }

    /// Respects cooperative cancellation (spec §5): resets the bead to
    /// `open`/unassigned without applying loop metadata, and returns.
    pub async fn handle_cancellation(&self, bead_id: &BeadId) -> DispatchResult<()> {
        self.inflight.lock().remove(bead_id);
        self.bead_store.update(bead_id, BeadUpdate::new().status(BeadStatus::Open).assigned_to(None)).await?;
        Ok(())
    }

    pub fn inflight_count(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Stale-agent detection for the maintenance loop (spec §5: "no
    /// heartbeat in 2x configured interval"). Mutating a stale agent to
    /// `dead` is outside `AgentStore`'s surface (spec §6) — the external
    /// agent-manager owns that transition; this only reports candidates.
    pub async fn detect_stale_agents(&self, project: &str, stale_after_ms: u64) -> DispatchResult<Vec<AgentId>> {
        let now_ms = self.clock.epoch_ms();
        let agents = self.agent_store.list_by_project(project).await?;
        Ok(agents
            .into_iter()
            .filter(|a| a.status != AgentStatus::Dead)
            .filter(|a| now_ms.saturating_sub(a.last_active_ms) >= stale_after_ms)
            .map(|a| a.id)
            .collect())
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
