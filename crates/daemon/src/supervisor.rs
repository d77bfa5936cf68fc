// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background loops (spec §5): a fallback dispatch loop that ticks
//! `DispatchOnce` per configured project when nothing else drives
//! dispatch, and a maintenance loop that sweeps stale agents and
//! auto-escalates beads the loop detector already flagged.
//!
//! Both loops are plain `tokio::spawn` tasks cooperating through a
//! [`CancellationToken`] rather than a raw `Receiver` — the token can be
//! cloned into as many loops as the supervisor ends up owning without
//! threading a channel through each one.

use ralph_core::SystemClock;
use ralph_dispatch::Dispatcher;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the two background loops for a single dispatcher instance.
/// `ResultHandler`'s own reaper is spawned separately by
/// [`ResultHandler::spawn_reaper`] — the supervisor only starts the
/// loops this spec assigns to the daemon proper.
pub struct Supervisor {
    dispatcher: Arc<Dispatcher<SystemClock>>,
    projects: Vec<String>,
    maintenance_interval: std::time::Duration,
    fallback_interval: std::time::Duration,
    heartbeat_stale_after: std::time::Duration,
    cancel: CancellationToken,
}

impl Supervisor {
    pub fn new(dispatcher: Arc<Dispatcher<SystemClock>>, projects: Vec<String>, config: &ralph_dispatch::DispatchConfig) -> Self {
        Self {
            dispatcher,
            projects,
            maintenance_interval: config.maintenance_interval,
            fallback_interval: config.fallback_dispatch_interval,
            heartbeat_stale_after: config.heartbeat_stale_after(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawn the fallback dispatch loop and the maintenance loop. Returns
    /// their join handles so the caller can await a clean shutdown.
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        vec![self.spawn_fallback_dispatch_loop(), self.spawn_maintenance_loop()]
    }

    fn spawn_fallback_dispatch_loop(&self) -> JoinHandle<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let projects = self.projects.clone();
        let interval_duration = self.fallback_interval;
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval_duration);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("fallback dispatch loop shutting down");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                for project in &projects {
                    let outcome = dispatcher.dispatch_once(project).await;
                    if outcome.dispatched {
                        tracing::info!(
                            project = %project,
                            bead_id = ?outcome.bead_id,
                            agent_id = ?outcome.agent_id,
                            "dispatched"
                        );
                    } else if let Some(reason) = &outcome.error {
                        tracing::debug!(project = %project, reason, "dispatch cycle parked");
                    }
                }
            }
        })
    }

    fn spawn_maintenance_loop(&self) -> JoinHandle<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let projects = self.projects.clone();
        let interval_duration = self.maintenance_interval;
        let stale_after = self.heartbeat_stale_after;
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval_duration);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("maintenance loop shutting down");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                for project in &projects {
                    run_maintenance_cycle(&dispatcher, project, stale_after).await;
                }
            }
        })
    }

    /// Signal both loops to stop and wait for them to exit.
    pub async fn shutdown(&self, handles: Vec<JoinHandle<()>>) {
        self.cancel.cancel();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

/// One maintenance sweep for a single project (spec §5): stale-agent
/// detection and loop-detected auto-escalation. File-lock cleanup is a
/// worktree-mechanics concern the spec places out of scope (§1).
async fn run_maintenance_cycle(dispatcher: &Arc<Dispatcher<SystemClock>>, project: &str, stale_after: std::time::Duration) {
    match dispatcher.detect_stale_agents(project, stale_after.as_millis() as u64).await {
        Ok(stale) if !stale.is_empty() => {
            tracing::warn!(project, count = stale.len(), agents = ?stale, "agents missed their heartbeat window");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(project, error = %err, "stale-agent sweep failed"),
    }

    match dispatcher.auto_escalate_loop_detected(project).await {
        Ok(count) if count > 0 => {
            tracing::warn!(project, count, "auto-escalated loop-detected beads to CEO decisions");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(project, error = %err, "loop-detected escalation sweep failed"),
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
