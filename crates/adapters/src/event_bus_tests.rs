// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ralph_core::BeadId;

#[tokio::test]
async fn publish_bead_event_preserves_order() {
    let bus = InMemoryEventBus::new();
    let bead_id = BeadId::new();
    bus.publish_bead_event(EventKind::BeadAssigned, bead_id, "proj-a", HashMap::new()).await.unwrap();
    bus.publish_bead_event(EventKind::BeadStatusChange(BeadStatus::InProgress), bead_id, "proj-a", HashMap::new())
        .await
        .unwrap();

    let kinds = bus.kinds();
    assert_eq!(kinds, vec![EventKind::BeadAssigned, EventKind::BeadStatusChange(BeadStatus::InProgress)]);
}

#[tokio::test]
async fn events_carry_project_and_bead_id() {
    let bus = InMemoryEventBus::new();
    let bead_id = BeadId::new();
    bus.publish_bead_event(EventKind::BeadCreated, bead_id, "proj-a", HashMap::new()).await.unwrap();

    let events = bus.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bead_id, Some(bead_id));
    assert_eq!(events[0].project_id, "proj-a");
}
