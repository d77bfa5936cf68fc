// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::fake::FakeMessageBus;
use super::*;
use ralph_core::BeadId;

fn sample_msg() -> TaskMessage {
    TaskMessage {
        correlation_id: "dispatch-bd--x-1".to_string(),
        bead_id: BeadId::new(),
        project_id: "proj-a".to_string(),
        agent_id: AgentId::from("agt-1"),
        payload: String::new(),
    }
}

#[tokio::test]
async fn null_bus_accepts_and_drops_everything() {
    let bus = NullMessageBus;
    assert!(bus.publish_task("proj-a", sample_msg()).await.is_ok());
    assert!(bus.publish_task_for_role("proj-a", "coder", sample_msg()).await.is_ok());
}

#[tokio::test]
async fn fake_bus_records_published_tasks() {
    let bus = FakeMessageBus::new();
    bus.publish_task("proj-a", sample_msg()).await.unwrap();
    bus.publish_task_for_role("proj-a", "coder", sample_msg()).await.unwrap();

    let published = bus.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].role, None);
    assert_eq!(published[1].role.as_deref(), Some("coder"));
}
