// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ralph_core::{AgentId, BeadId, ProviderId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bead not found: {0}")]
    BeadNotFound(BeadId),
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),
    #[error("provider not found: {0}")]
    ProviderNotFound(ProviderId),
    #[error("bead {bead} already assigned to {current}, cannot claim for {requested}")]
    AlreadyClaimed { bead: BeadId, current: AgentId, requested: AgentId },
    #[error("invalid update: {0}")]
    InvalidUpdate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
