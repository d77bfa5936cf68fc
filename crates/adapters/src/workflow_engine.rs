// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional per-bead workflow engine (spec §6, §4.5).
//!
//! Only consulted when a workflow execution exists for a bead. The
//! dispatcher advances it with a condition derived from the dispatch
//! outcome and the current node's type (§4.5: `Approval`/`Verify` nodes
//! use `approved`/`rejected` instead of `success`/`failure`).

use async_trait::async_trait;
use ralph_core::BeadId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no execution for bead: {0}")]
    NoExecution(BeadId),
    #[error("advance failed: {0}")]
    AdvanceFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCondition {
    Success,
    Failure,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowNodeType {
    Design,
    Implement,
    Verify,
    Approval,
}

impl WorkflowNodeType {
    /// Maps a raw success/failure outcome onto the condition this node
    /// type actually expects (spec §4.5).
    pub fn condition_for_outcome(self, succeeded: bool) -> WorkflowCondition {
        match (self, succeeded) {
            (WorkflowNodeType::Approval | WorkflowNodeType::Verify, true) => WorkflowCondition::Approved,
            (WorkflowNodeType::Approval | WorkflowNodeType::Verify, false) => WorkflowCondition::Rejected,
            (_, true) => WorkflowCondition::Success,
            (_, false) => WorkflowCondition::Failure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    Escalated,
    Completed,
}

#[derive(Debug, Clone)]
pub struct WorkflowExecution {
    pub execution_id: String,
    pub bead_id: BeadId,
    pub current_node: WorkflowNodeType,
    pub state: ExecutionState,
}

/// Title/body pair used to populate a CEO escalation decision.
#[derive(Debug, Clone)]
pub struct EscalationInfo {
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait WorkflowEngine: Send + Sync + 'static {
    async fn get_execution_by_bead(&self, bead_id: &BeadId) -> Option<WorkflowExecution>;

    async fn is_node_ready(&self, execution_id: &str) -> bool;

    async fn advance(
        &self,
        execution_id: &str,
        condition: WorkflowCondition,
        data: &std::collections::HashMap<String, String>,
    ) -> Result<ExecutionState, WorkflowError>;

    async fn escalation_info(&self, execution_id: &str) -> Result<EscalationInfo, WorkflowError>;
}

/// Absence of a workflow engine (spec's default): dispatch skips the
/// workflow-advancement step entirely when this is the configured engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorkflowEngine;

#[async_trait]
impl WorkflowEngine for NoWorkflowEngine {
    async fn get_execution_by_bead(&self, _bead_id: &BeadId) -> Option<WorkflowExecution> {
        None
    }

    async fn is_node_ready(&self, _execution_id: &str) -> bool {
        false
    }

    async fn advance(
        &self,
        execution_id: &str,
        _condition: WorkflowCondition,
        _data: &std::collections::HashMap<String, String>,
    ) -> Result<ExecutionState, WorkflowError> {
        Err(WorkflowError::AdvanceFailed(format!("no workflow engine configured (execution {execution_id})")))
    }

    async fn escalation_info(&self, execution_id: &str) -> Result<EscalationInfo, WorkflowError> {
        Err(WorkflowError::AdvanceFailed(format!("no workflow engine configured (execution {execution_id})")))
    }
}

#[cfg(test)]
#[path = "workflow_engine_tests.rs"]
mod tests;
