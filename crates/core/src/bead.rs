// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead identifier and data model.
//!
//! A bead is a unit of work drawn from a dependency graph. Dispatch only
//! mutates `status`, `context`, and `assigned_to` — identity, relations,
//! and type are owned by whatever created the bead.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

crate::define_id! {
    /// Unique identifier for a bead.
    pub struct BeadId("bd--");
}

/// What kind of work a bead represents.
///
/// Decisions are never dispatched — they exist purely for human
/// resolution (see [`crate::decision`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeadType {
    Task,
    Decision,
    Epic,
}

crate::simple_display! {
    BeadType {
        Task => "task",
        Decision => "decision",
        Epic => "epic",
    }
}

/// Lifecycle status of a bead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeadStatus {
    Open,
    InProgress,
    Blocked,
    Done,
    Closed,
    Cancelled,
}

impl BeadStatus {
    /// Statuses that count as "finished" for readiness and blocker checks.
    pub fn is_terminal(self) -> bool {
        matches!(self, BeadStatus::Done | BeadStatus::Closed | BeadStatus::Cancelled)
    }

    /// Statuses the dispatcher is willing to (re)dispatch against.
    pub fn is_dispatchable_status(self) -> bool {
        matches!(self, BeadStatus::Open | BeadStatus::InProgress)
    }
}

crate::simple_display! {
    BeadStatus {
        Open => "open",
        InProgress => "in_progress",
        Blocked => "blocked",
        Done => "done",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

/// Dispatch priority. Numerically ascending = more urgent: `P0` is the
/// most urgent and sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

crate::simple_display! {
    Priority {
        P0 => "P0",
        P1 => "P1",
        P2 => "P2",
        P3 => "P3",
    }
}

/// A unit of work drawn from a dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bead {
    pub id: BeadId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub bead_type: BeadType,
    pub status: BeadStatus,
    pub priority: Priority,
    pub project: String,

    #[serde(default)]
    pub blocked_by: HashSet<BeadId>,
    #[serde(default)]
    pub blocks: HashSet<BeadId>,
    #[serde(default)]
    pub parent: Option<BeadId>,
    #[serde(default)]
    pub children: HashSet<BeadId>,
    #[serde(default)]
    pub related_to: HashSet<BeadId>,

    #[serde(default)]
    pub assigned_to: Option<AgentId>,
    #[serde(default)]
    pub tags: HashSet<String>,

    /// Dispatch metadata: a free-form string->string map. Deliberately
    /// untyped so new heuristics can be added without a schema migration;
    /// see [`crate::context`] for the typed accessors dispatch uses.
    #[serde(default)]
    pub context: HashMap<String, String>,

    /// Epoch milliseconds of the last mutation. `None` sorts last.
    #[serde(default)]
    pub updated_at_ms: Option<u64>,
}

impl Bead {
    pub fn new(id: BeadId, title: impl Into<String>, bead_type: BeadType, project: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            bead_type,
            status: BeadStatus::Open,
            priority: Priority::P2,
            project: project.into(),
            blocked_by: HashSet::new(),
            blocks: HashSet::new(),
            parent: None,
            children: HashSet::new(),
            related_to: HashSet::new(),
            assigned_to: None,
            tags: HashSet::new(),
            context: HashMap::new(),
            updated_at_ms: None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// True if every invariant in spec §3 holds. Used by tests and by
    /// stores that want to assert before persisting.
    pub fn invariants_hold(&self) -> bool {
        if self.status == BeadStatus::InProgress && self.assigned_to.is_none() {
            return false;
        }
        if self.status == BeadStatus::Blocked && !crate::context::has_block_reason(&self.context) {
            return false;
        }
        true
    }
}

crate::builder! {
    pub struct BeadBuilder => Bead {
        into {
            title: String = "test bead",
            project: String = "proj",
            description: String = "",
        }
        set {
            bead_type: BeadType = BeadType::Task,
            status: BeadStatus = BeadStatus::Open,
            priority: Priority = Priority::P2,
            blocked_by: HashSet<BeadId> = HashSet::new(),
            blocks: HashSet<BeadId> = HashSet::new(),
            children: HashSet<BeadId> = HashSet::new(),
            related_to: HashSet<BeadId> = HashSet::new(),
            tags: HashSet<String> = HashSet::new(),
            context: HashMap<String, String> = HashMap::new(),
        }
        option {
            parent: BeadId = None,
            assigned_to: AgentId = None,
            updated_at_ms: u64 = None,
        }
        computed {
            id: BeadId = BeadId::new(),
        }
    }
}

#[cfg(test)]
#[path = "bead_tests.rs"]
mod tests;
