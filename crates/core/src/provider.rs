// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider identifier and entity.
//!
//! A provider is an LLM endpoint. Dispatch reads providers to find one
//! to bind an agent to and to decide whether any active provider exists
//! at all (the provider guard, spec §4.1 step 1); it never mutates them.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a provider.
    pub struct ProviderId("prv-");
}

/// Health/availability of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Active,
    Inactive,
}

crate::simple_display! {
    ProviderStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

/// A model available on a provider, as reported by `GetModels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
}

/// An LLM endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub endpoint: String,
    pub status: ProviderStatus,
    pub selected_model: String,
    pub configured_model: String,
    pub last_heartbeat_at_ms: Option<u64>,
    pub last_heartbeat_latency_ms: Option<u64>,
    pub model_score: f64,
}

impl Provider {
    pub fn new(id: ProviderId, endpoint: impl Into<String>) -> Self {
        Self {
            id,
            endpoint: endpoint.into(),
            status: ProviderStatus::Active,
            selected_model: String::new(),
            configured_model: String::new(),
            last_heartbeat_at_ms: None,
            last_heartbeat_latency_ms: None,
            model_score: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProviderStatus::Active
    }
}

crate::builder! {
    pub struct ProviderBuilder => Provider {
        into {
            endpoint: String = "https://provider.example/v1",
            selected_model: String = "",
            configured_model: String = "",
        }
        set {
            status: ProviderStatus = ProviderStatus::Active,
            model_score: f64 = 0.0,
        }
        option {
            last_heartbeat_at_ms: u64 = None,
            last_heartbeat_latency_ms: u64 = None,
        }
        computed {
            id: ProviderId = ProviderId::new(),
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
