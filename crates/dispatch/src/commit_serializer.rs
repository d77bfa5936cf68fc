// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CommitSerializer (spec §4.9): a single-flight queue that serializes
//! git commits across agents within a project. At most one commit is in
//! flight per process; waiters are granted the lock in FIFO order.
//! A holder that has sat past `commit_lock_timeout` is forcibly evicted
//! by the next caller rather than left to block the queue forever.

use crate::error::{DispatchError, DispatchResult};
use ralph_core::{AgentId, BeadId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
struct Holder {
    token: u64,
    bead_id: BeadId,
    agent_id: AgentId,
    started_at_ms: u64,
}

struct State {
    holder: Option<Holder>,
    waiters: VecDeque<(u64, oneshot::Sender<()>)>,
}

/// Held while a commit is in progress. Dropping it (or calling
/// [`CommitLock::release`] explicitly) hands the lock to the next
/// waiter, if any.
pub struct CommitLock {
    serializer: Arc<CommitSerializer>,
    token: u64,
    released: bool,
}

impl CommitLock {
    pub fn release(mut self) {
        self.serializer.release(self.token);
        self.released = true;
    }
}

impl Drop for CommitLock {
    fn drop(&mut self) {
        if !self.released {
            self.serializer.release(self.token);
        }
    }
}

pub struct CommitSerializer {
    state: Mutex<State>,
    next_token: AtomicU64,
    timeout: Duration,
}

impl CommitSerializer {
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self { state: Mutex::new(State { holder: None, waiters: VecDeque::new() }), next_token: AtomicU64::new(1), timeout })
    }

    /// `acquireCommitLock(ctx, beadID, agentID)`. `now_ms` is supplied
    /// by the caller's clock so staleness checks stay deterministic
    /// under tests. Resolves once the lock is held, or returns
    /// [`DispatchError::CommitCancelled`] if `cancelled` fires first.
    pub async fn acquire(
        self: &Arc<Self>,
        bead_id: BeadId,
        agent_id: AgentId,
        now_ms: u64,
        cancelled: impl std::future::Future<Output = ()>,
    ) -> DispatchResult<CommitLock> {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let rx = {
            let mut state = self.state.lock();
            match &state.holder {
                None => {
                    state.holder = Some(Holder { token, bead_id, agent_id, started_at_ms: now_ms });
                    None
                }
                Some(current) if now_ms.saturating_sub(current.started_at_ms) >= self.timeout.as_millis() as u64 => {
                    tracing::warn!(stale_bead = %current.bead_id, stale_agent = %current.agent_id, "evicting stale commit lock holder");
                    state.holder = Some(Holder { token, bead_id, agent_id, started_at_ms: now_ms });
                    None
                }
                Some(_) => {
                    let (tx, rx) = oneshot::channel();
                    state.waiters.push_back((token, tx));
                    Some(rx)
                }
            }
        };

        if let Some(rx) = rx {
            tokio::select! {
                result = rx => {
                    result.map_err(|_| DispatchError::CommitCancelled)?;
                }
                _ = cancelled => {
                    self.cancel_waiter(token);
                    return Err(DispatchError::CommitCancelled);
                }
            }
            // We were granted the lock via hand-off; the holder record release()
            // left behind is a placeholder (it doesn't know our bead/agent id or
            // the current time), so finalize it with the real values now.
            let mut state = self.state.lock();
            if state.holder.as_ref().map(|h| h.token) == Some(token) {
                state.holder = Some(Holder { token, bead_id, agent_id, started_at_ms: now_ms });
            }
        }

        Ok(CommitLock { serializer: Arc::clone(self), token, released: false })
    }

    fn cancel_waiter(&self, token: u64) {
        let mut state = self.state.lock();
        state.waiters.retain(|(t, _)| *t != token);
    }

    fn release(&self, token: u64) {
        let mut state = self.state.lock();
        let is_current_holder = state.holder.as_ref().map(|h| h.token) == Some(token);
        if !is_current_holder {
            // Already evicted by a stale-holder takeover; nothing to do.
            return;
        }
        state.holder = None;
        while let Some((next_token, tx)) = state.waiters.pop_front() {
            if tx.send(()).is_ok() {
                // Placeholder: the woken waiter finalizes bead_id/agent_id/started_at_ms
                // once it resumes. started_at_ms=MAX means "not stale" until it does.
                state.holder = Some(Holder { token: next_token, bead_id: BeadId::new(), agent_id: AgentId::from(""), started_at_ms: u64::MAX });
                break;
            }
            // Receiver dropped (cancelled) before we could hand off; try the next waiter.
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().holder.is_some()
    }

    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

#[cfg(test)]
#[path = "commit_serializer_tests.rs"]
mod tests;
