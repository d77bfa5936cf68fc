// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision types for CEO escalation.
//!
//! A decision is the human-facing counterpart to a stuck or escalated
//! bead: dispatch never resolves one itself, it only creates it (as a
//! P0 `decision` bead, spec §4.1 step 6) and later applies whatever
//! resolution a human picked.

use crate::bead::BeadId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a decision.
    pub struct DecisionId("dcn-");
}

/// Where the decision originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Raised because the loop detector classified the bead as stuck.
    LoopDetected,
    /// Raised because dispatch_count reached the hard hop limit.
    HardLimit,
    /// Raised because a workflow engine transitioned an execution to `Escalated`.
    WorkflowEscalation,
}

crate::simple_display! {
    DecisionSource {
        LoopDetected => "loop_detected",
        HardLimit => "hard_limit",
        WorkflowEscalation => "workflow_escalation",
    }
}

/// A fixed answer to a CEO escalation decision (spec §4.1 step 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOption {
    Approve,
    Deny,
    NeedsMoreInfo,
}

crate::simple_display! {
    DecisionOption {
        Approve => "approve",
        Deny => "deny",
        NeedsMoreInfo => "needs_more_info",
    }
}

impl DecisionOption {
    pub const ALL: [DecisionOption; 3] = [Self::Approve, Self::Deny, Self::NeedsMoreInfo];
}

/// A P0 decision bead surfaced for human resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    /// The bead that triggered escalation and whose outcome this decision governs.
    pub parent_bead: BeadId,
    pub source: DecisionSource,
    pub question: String,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<DecisionOption>,
}

impl Decision {
    pub fn new(id: DecisionId, parent_bead: BeadId, source: DecisionSource, question: impl Into<String>, created_at_ms: u64) -> Self {
        Self {
            id,
            parent_bead,
            source,
            question: question.into(),
            created_at_ms,
            resolved_at_ms: None,
            resolution: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at_ms.is_some()
    }

    /// Apply a resolution, per spec §4.1 step 6: `approve→closed`,
    /// `deny→open, cleared, annotated`, `needs_more_info→open, reassigned, annotated`.
    pub fn resolve(&mut self, option: DecisionOption, resolved_at_ms: u64) {
        self.resolution = Some(option);
        self.resolved_at_ms = Some(resolved_at_ms);
    }
}

crate::builder! {
    pub struct DecisionBuilder => Decision {
        into { question: String = "escalated bead needs a decision" }
        set { source: DecisionSource = DecisionSource::LoopDetected }
        option {
            resolution: DecisionOption = None,
            resolved_at_ms: u64 = None,
        }
        computed {
            id: DecisionId = DecisionId::new(),
            parent_bead: BeadId = BeadId::new(),
            created_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
