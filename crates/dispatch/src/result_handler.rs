// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ResultHandler (spec §4.10): tracks `correlation_id -> pending task`
//! for async result correlation, and reaps entries that never got a
//! result back.

use parking_lot::RwLock;
use ralph_core::{AgentId, BeadId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const REAP_AFTER_MS: u64 = 60 * 60 * 1000;

/// One task dispatched to an agent, awaiting a result.
#[derive(Debug, Clone)]
pub struct PendingTask {
    pub project: String,
    pub bead_id: BeadId,
    pub agent_id: AgentId,
    pub role: String,
    pub registered_at_ms: u64,
    pub last_update_ms: u64,
}

/// Status an async worker reports back for a correlation ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Success,
    Failure,
    InProgress,
}

/// Tracks pending tasks by correlation ID, guarded by its own lock and
/// with its own reaper — it has no relationship to the dispatcher's
/// `inflight` set beyond both being populated around the same dispatch.
pub struct ResultHandler {
    pending: RwLock<HashMap<String, PendingTask>>,
}

impl ResultHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { pending: RwLock::new(HashMap::new()) })
    }

    /// `Track(correlationID, project, bead, agent, role)`.
    pub fn track(&self, correlation_id: impl Into<String>, task: PendingTask) {
        self.pending.write().insert(correlation_id.into(), task);
    }

    /// `HandleResult(result)`. On `success`/`failure` the entry is
    /// removed and returned; on `in_progress` it is kept with a
    /// refreshed `last_update_ms` and a clone is returned.
    pub fn handle_result(&self, correlation_id: &str, status: ResultStatus, now_ms: u64) -> Option<PendingTask> {
        match status {
            ResultStatus::Success | ResultStatus::Failure => self.pending.write().remove(correlation_id),
            ResultStatus::InProgress => {
                let mut pending = self.pending.write();
                let task = pending.get_mut(correlation_id)?;
                task.last_update_ms = now_ms;
                Some(task.clone())
            }
        }
    }

    pub fn get(&self, correlation_id: &str) -> Option<PendingTask> {
        self.pending.read().get(correlation_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.pending.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose `last_update_ms` is older than `now_ms - REAP_AFTER_MS`,
    /// returning the reaped correlation IDs.
    pub fn reap(&self, now_ms: u64) -> Vec<String> {
        let mut pending = self.pending.write();
        let stale: Vec<String> = pending
            .iter()
            .filter(|(_, task)| now_ms.saturating_sub(task.last_update_ms) >= REAP_AFTER_MS)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            pending.remove(id);
        }
        stale
    }

    /// Spawn the background reaper: sweeps every 5 minutes, dropping
    /// entries untouched for over an hour.
    pub fn spawn_reaper<C: ralph_core::Clock>(self: &Arc<Self>, clock: C) -> tokio::task::JoinHandle<()> {
        let handler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(5 * 60));
            loop {
                interval.tick().await;
                let now_ms = clock.epoch_ms();
                let reaped = handler.reap(now_ms);
                if !reaped.is_empty() {
                    tracing::info!(count = reaped.len(), "reaped stale pending results");
                }
            }
        })
    }
}

impl Default for ResultHandler {
    fn default() -> Self {
        Self { pending: RwLock::new(HashMap::new()) }
    }
}

#[cfg(test)]
#[path = "result_handler_tests.rs"]
mod tests;
