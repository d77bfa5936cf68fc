// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ralph_core::BeadId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] ralph_store::StoreError),
    #[error(transparent)]
    MessageBus(#[from] ralph_adapters::MessageBusError),
    #[error(transparent)]
    EventBus(#[from] ralph_adapters::EventBusError),
    #[error(transparent)]
    Workflow(#[from] ralph_adapters::WorkflowError),
    #[error(transparent)]
    Git(#[from] ralph_adapters::GitError),
    #[error("bead {0} is already in progress with its assigned agent")]
    AlreadyInProgress(BeadId),
    #[error("commit lock wait was cancelled")]
    CommitCancelled,
    #[error("dispatch was cancelled")]
    Cancelled,
}

pub type DispatchResult<T> = Result<T, DispatchError>;
