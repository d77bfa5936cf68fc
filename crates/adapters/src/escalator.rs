// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional escalation notification side-channel (spec §9's capability
//! interface list).
//!
//! The CEO decision bead the dispatcher creates (spec §4.5, §7.6) is
//! always the store-of-record for an escalation — this interface never
//! replaces it. It's a best-effort notice (page, Slack message, email)
//! fired alongside the decision bead so a human finds out promptly
//! instead of only when they next poll for open decisions; a failure to
//! notify is logged and otherwise ignored.

use async_trait::async_trait;
use ralph_core::{BeadId, DecisionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EscalatorError {
    #[error("escalation notice failed: {0}")]
    Failed(String),
}

/// A single escalation notice, built from the decision bead just created.
#[derive(Debug, Clone)]
pub struct EscalationNotice {
    pub decision_id: DecisionId,
    pub parent_bead: BeadId,
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait Escalator: Send + Sync + 'static {
    async fn notify(&self, notice: EscalationNotice) -> Result<(), EscalatorError>;
}

/// Swallows every notice. Used when no paging/chat integration is
/// configured; the decision bead itself is still created and queryable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEscalator;

#[async_trait]
impl Escalator for NullEscalator {
    async fn notify(&self, _notice: EscalationNotice) -> Result<(), EscalatorError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    pub struct FakeEscalator {
        notices: Arc<Mutex<Vec<EscalationNotice>>>,
    }

    impl FakeEscalator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn notices(&self) -> Vec<EscalationNotice> {
            self.notices.lock().clone()
        }
    }

    #[async_trait]
    impl Escalator for FakeEscalator {
        async fn notify(&self, notice: EscalationNotice) -> Result<(), EscalatorError> {
            self.notices.lock().push(notice);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "escalator_tests.rs"]
mod tests;
