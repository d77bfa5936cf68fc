// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup. `filter` comes from [`crate::config::LogConfig`] and
//! falls back to `RUST_LOG` the way `tracing-subscriber`'s `EnvFilter`
//! does natively when the config value itself is absent.

use tracing_subscriber::EnvFilter;

/// Install a global subscriber. Safe to call at most once per process;
/// a second call is a no-op rather than a panic, since `ralphd`'s own
/// tests and `main` can both reach this during a single binary's life.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).try_init();
}
