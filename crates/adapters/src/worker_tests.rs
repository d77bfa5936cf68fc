// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ralph_core::{AgentId, BeadId};

fn task() -> WorkerTask {
    WorkerTask {
        correlation_id: "corr-1".to_string(),
        bead_id: BeadId::new(),
        project_id: "proj-a".to_string(),
        agent_id: AgentId::new(),
        payload: "do the thing".to_string(),
    }
}

#[tokio::test]
async fn no_worker_fails_fast_naming_the_correlation_id() {
    let err = NoWorker.execute(task()).await.unwrap_err();
    assert!(err.error_message.contains("corr-1"));
}
