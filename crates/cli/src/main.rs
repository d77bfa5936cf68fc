// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ralph`: launches the work-dispatch orchestrator in the foreground.
//! Spec §6 keeps this surface deliberately thin — one command, flags
//! limited to config path plus clap's built-in `--version`/`--help`.

use clap::Parser;
use std::path::PathBuf;

/// Run the ralph dispatch orchestrator.
#[derive(Parser)]
#[command(name = "ralph", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to $RALPHD_CONFIG, then built-in defaults).
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ralph_daemon::Config::load(cli.config.as_deref())
        .map_err(|err| anyhow::anyhow!("failed to load config: {err}"))?;

    ralph_daemon::logging::init(&config.log.filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), git = env!("BUILD_GIT_HASH"), "ralph starting");

    let handle = ralph_daemon::build(&config);
    let handles = handle.supervisor.spawn();

    tokio::signal::ctrl_c().await.ok();
    tracing::info!("received shutdown signal");

    handle.supervisor.shutdown(handles).await;
    tracing::info!("ralph stopped");
    Ok(())
}
