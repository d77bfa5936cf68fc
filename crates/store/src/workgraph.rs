// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness computation over the bead dependency graph (spec §3 WorkGraph).
//!
//! The graph itself — nodes are beads, directed edges run from each entry
//! in `blocks` — is never materialized as a standalone structure; stores
//! compute readiness by looking up each blocker's current status.

use ralph_core::{Bead, BeadId, BeadStatus};

/// A bead is ready iff its own status is dispatchable and none of its
/// blockers is still non-terminal. A blocker the store has no record of
/// is treated as already resolved (it cannot block forever).
pub fn is_ready<F>(bead: &Bead, blocker_status: F) -> bool
where
    F: Fn(&BeadId) -> Option<BeadStatus>,
{
    if !bead.status.is_dispatchable_status() {
        return false;
    }
    bead.blocked_by.iter().all(|blocker| match blocker_status(blocker) {
        Some(status) => status.is_terminal(),
        None => true,
    })
}

#[cfg(test)]
#[path = "workgraph_tests.rs"]
mod tests;
