// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn approval_node_uses_approved_rejected_not_success_failure() {
    assert_eq!(WorkflowNodeType::Approval.condition_for_outcome(true), WorkflowCondition::Approved);
    assert_eq!(WorkflowNodeType::Approval.condition_for_outcome(false), WorkflowCondition::Rejected);
    assert_eq!(WorkflowNodeType::Verify.condition_for_outcome(true), WorkflowCondition::Approved);
    assert_eq!(WorkflowNodeType::Verify.condition_for_outcome(false), WorkflowCondition::Rejected);
}

#[test]
fn ordinary_nodes_use_success_failure() {
    assert_eq!(WorkflowNodeType::Implement.condition_for_outcome(true), WorkflowCondition::Success);
    assert_eq!(WorkflowNodeType::Implement.condition_for_outcome(false), WorkflowCondition::Failure);
    assert_eq!(WorkflowNodeType::Design.condition_for_outcome(true), WorkflowCondition::Success);
}

#[tokio::test]
async fn no_workflow_engine_has_no_executions() {
    let engine = NoWorkflowEngine;
    assert!(engine.get_execution_by_bead(&BeadId::new()).await.is_none());
}

#[tokio::test]
async fn no_workflow_engine_refuses_to_advance() {
    let engine = NoWorkflowEngine;
    let result = engine.advance("exec-1", WorkflowCondition::Success, &std::collections::HashMap::new()).await;
    assert!(result.is_err());
}
