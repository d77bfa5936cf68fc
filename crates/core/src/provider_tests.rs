// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn fresh_provider_is_active() {
    let provider = Provider::new(ProviderId::new(), "https://p.example/v1");
    assert!(provider.is_active());
}

#[test]
fn inactive_provider_is_not_active() {
    let provider = Provider::builder().status(ProviderStatus::Inactive).build();
    assert!(!provider.is_active());
}

#[test]
fn builder_defaults_are_sane() {
    let provider = Provider::builder().build();
    assert_eq!(provider.status, ProviderStatus::Active);
    assert_eq!(provider.last_heartbeat_at_ms, None);
}
