// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level error type: config loading and supervisor startup, wrapping
//! the dispatch core's own error where the supervisor touches it directly.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },
    #[error("no HOME directory to derive a default state dir from")]
    NoStateDir,
    #[error(transparent)]
    Dispatch(#[from] ralph_dispatch::DispatchError),
}

pub type DaemonResult<T> = Result<T, DaemonError>;
