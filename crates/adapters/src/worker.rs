// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inline worker execution (spec §4.1 step 11, §4.4 legacy mode).
//!
//! When no message bus is configured, dispatch still needs something to
//! actually run the task against instead of just marking the bead
//! in-progress and losing track of it. This is that something: a thin
//! synchronous seam the dispatcher calls through in place of publishing
//! to a bus, with the same success/failure shape a bus consumer would
//! eventually report back.

use async_trait::async_trait;

/// A task to run inline, mirroring the fields a published
/// [`crate::message_bus::TaskMessage`] would carry.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    pub correlation_id: String,
    pub bead_id: ralph_core::BeadId,
    pub project_id: String,
    pub agent_id: ralph_core::AgentId,
    pub payload: String,
}

/// A completed inline run, carrying just enough to build a dispatch
/// `SuccessReport` (provider/model/output/tokens stay with the caller
/// since the worker only ever sees its own `WorkerTask`).
#[derive(Debug, Clone, Default)]
pub struct WorkerSuccess {
    pub provider_model: String,
    pub agent_output: String,
    pub agent_tokens: u64,
    pub agent_task_id: String,
    pub agent_worker_id: String,
}

#[derive(Debug, Clone)]
pub struct WorkerFailure {
    pub error_message: String,
}

#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Run `task` to completion and report how it went. Unlike the
    /// message-bus path, this blocks the dispatch cycle on the result —
    /// it is the legacy, no-bus-configured fallback, not the steady
    /// state (spec §4.4).
    async fn execute(&self, task: WorkerTask) -> Result<WorkerSuccess, WorkerFailure>;
}

/// The default when neither a message bus nor an inline worker is
/// configured. Fails fast with a clear error instead of silently
/// no-op'ing, so a dispatched bead never gets stranded in `in_progress`
/// forever (spec §4.1 step 11 requires *something* executes it).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorker;

#[async_trait]
impl Worker for NoWorker {
    async fn execute(&self, task: WorkerTask) -> Result<WorkerSuccess, WorkerFailure> {
        Err(WorkerFailure { error_message: format!("no inline worker configured for task {}", task.correlation_id) })
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Scripted inline worker: returns whatever `result` is set to,
    /// recording every task it was asked to run.
    #[derive(Clone)]
    pub struct FakeWorker {
        result: Arc<Mutex<Result<WorkerSuccess, WorkerFailure>>>,
        executed: Arc<Mutex<Vec<WorkerTask>>>,
    }

    impl FakeWorker {
        pub fn succeeding(success: WorkerSuccess) -> Self {
            Self { result: Arc::new(Mutex::new(Ok(success))), executed: Arc::new(Mutex::new(Vec::new())) }
        }

        pub fn failing(failure: WorkerFailure) -> Self {
            Self { result: Arc::new(Mutex::new(Err(failure))), executed: Arc::new(Mutex::new(Vec::new())) }
        }

        pub fn executed(&self) -> Vec<WorkerTask> {
            self.executed.lock().clone()
        }
    }

    #[async_trait]
    impl Worker for FakeWorker {
        async fn execute(&self, task: WorkerTask) -> Result<WorkerSuccess, WorkerFailure> {
            self.executed.lock().push(task);
            self.result.lock().clone()
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
