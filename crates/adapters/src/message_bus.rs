// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional task-publication bus (spec §4.4, §6).
//!
//! When no bus is configured, dispatch executes the worker call inline
//! (legacy mode) instead of publishing a message for a separate worker
//! process to pick up.

use async_trait::async_trait;
use ralph_core::{AgentId, BeadId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageBusError {
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

/// A task message routed to a worker, keyed by correlation ID.
#[derive(Debug, Clone)]
pub struct TaskMessage {
    pub correlation_id: String,
    pub bead_id: BeadId,
    pub project_id: String,
    pub agent_id: AgentId,
    pub payload: String,
}

#[async_trait]
pub trait MessageBus: Send + Sync + 'static {
    async fn publish_task(&self, project_id: &str, msg: TaskMessage) -> Result<(), MessageBusError>;

    /// Publish routed to agents matching `role` rather than a specific agent.
    async fn publish_task_for_role(&self, project_id: &str, role: &str, msg: TaskMessage) -> Result<(), MessageBusError>;
}

/// No-op bus. Its presence/absence is how the dispatcher decides between
/// publish-and-await and legacy inline execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMessageBus;

#[async_trait]
impl MessageBus for NullMessageBus {
    async fn publish_task(&self, _project_id: &str, _msg: TaskMessage) -> Result<(), MessageBusError> {
        Ok(())
    }

    async fn publish_task_for_role(&self, _project_id: &str, _role: &str, _msg: TaskMessage) -> Result<(), MessageBusError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct PublishedTask {
        pub project_id: String,
        pub role: Option<String>,
        pub msg: TaskMessage,
    }

    #[derive(Default)]
    pub struct FakeMessageBus {
        published: Arc<Mutex<Vec<PublishedTask>>>,
    }

    impl FakeMessageBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<PublishedTask> {
            self.published.lock().clone()
        }
    }

    #[async_trait]
    impl MessageBus for FakeMessageBus {
        async fn publish_task(&self, project_id: &str, msg: TaskMessage) -> Result<(), MessageBusError> {
            self.published.lock().push(PublishedTask { project_id: project_id.to_string(), role: None, msg });
            Ok(())
        }

        async fn publish_task_for_role(&self, project_id: &str, role: &str, msg: TaskMessage) -> Result<(), MessageBusError> {
            self.published.lock().push(PublishedTask { project_id: project_id.to_string(), role: Some(role.to_string()), msg });
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "message_bus_tests.rs"]
mod tests;
