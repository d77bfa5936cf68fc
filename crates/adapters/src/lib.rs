// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ralph-adapters: optional external collaborators consumed by dispatch —
//! message bus, event bus, workflow engine, git operations, inline
//! worker execution, and escalation notification.

pub mod escalator;
pub mod event_bus;
pub mod git_operator;
pub mod message_bus;
pub mod worker;
pub mod workflow_engine;

pub use escalator::{Escalator, EscalationNotice, EscalatorError, NullEscalator};
pub use event_bus::{Event, EventBus, EventBusError, EventKind, InMemoryEventBus};
pub use git_operator::{GitError, GitOperator, GitStatus, NoopGitOperator};
pub use message_bus::{MessageBus, MessageBusError, NullMessageBus, TaskMessage};
pub use worker::{NoWorker, Worker, WorkerFailure, WorkerSuccess, WorkerTask};
pub use workflow_engine::{
    EscalationInfo, ExecutionState, NoWorkflowEngine, WorkflowCondition, WorkflowEngine, WorkflowError, WorkflowExecution,
    WorkflowNodeType,
};

#[cfg(any(test, feature = "test-support"))]
pub use escalator::fake::FakeEscalator;
#[cfg(any(test, feature = "test-support"))]
pub use message_bus::fake::FakeMessageBus;
#[cfg(any(test, feature = "test-support"))]
pub use worker::fake::FakeWorker;
