// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ralph-dispatch: the work-dispatch core.
//!
//! [`Dispatcher`] is the entry point — one `dispatch_once` call per cycle,
//! with `apply_success`/`apply_failure` correlating an async worker result
//! back onto the bead it ran against. Everything else in this crate is a
//! pure helper the dispatcher calls into: [`selector`] decides which bead
//! goes to which agent, [`loop_detector`] and [`auto_bug_router`] feed it
//! context annotations, [`result_handler`] and [`commit_serializer`] own
//! the two pieces of cross-cutting state a dispatch cycle touches besides
//! the stores themselves.

mod auto_bug_router;
mod commit_serializer;
mod config;
mod dispatcher;
mod error;
mod loop_detector;
mod persona_matcher;
mod result_handler;
mod roles;
mod selector;

pub use commit_serializer::{CommitLock, CommitSerializer};
pub use config::DispatchConfig;
pub use dispatcher::{
    Dispatcher, DispatchOutcome, FailureReport, LoopTerminalReason, ReadinessCheck, ReadinessMode, SuccessReport,
};
pub use error::{DispatchError, DispatchResult};
pub use loop_detector::{
    is_stuck_in_loop, record_action, record_error, suggest_next_steps, ActionRecord, ActionType, ErrorRecord, ProgressMetrics, StuckReason,
};
pub use result_handler::{PendingTask, ResultHandler, ResultStatus};
pub use roles::RoleBucket;
pub use selector::{SelectorOutcome, SkipReason, WorkflowGate};
