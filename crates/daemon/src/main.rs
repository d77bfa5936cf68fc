// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ralphd`: the work-dispatch daemon. Loads config, wires the dispatch
//! core to the in-memory reference stores, and runs the fallback
//! dispatch loop and maintenance loop until signalled to stop.

use ralph_daemon::Config;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ralphd: failed to load config: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    ralph_daemon::logging::init(&config.log.filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ralphd starting");

    let handle = ralph_daemon::build(&config);
    let handles = handle.supervisor.spawn();

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install ctrl-c handler; shutting down immediately");
    } else {
        tracing::info!("received shutdown signal");
    }

    handle.supervisor.shutdown(handles).await;
    tracing::info!("ralphd stopped");
    std::process::ExitCode::SUCCESS
}
