// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead-scoped git operations consumed by commit processing (spec §4.9, §6).
//!
//! Mechanics (worktrees, SSH keys, VCS protocol) are explicitly out of
//! scope (spec §1); this is a thin seam the commit serializer calls
//! through while holding its lock.

use async_trait::async_trait;
use ralph_core::BeadId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git operation failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct GitStatus {
    pub dirty: bool,
    pub changed_paths: Vec<String>,
}

#[async_trait]
pub trait GitOperator: Send + Sync + 'static {
    async fn status(&self, bead_id: &BeadId) -> Result<GitStatus, GitError>;

    async fn diff(&self, bead_id: &BeadId) -> Result<String, GitError>;

    /// Commit and return the new commit SHA.
    async fn commit(&self, bead_id: &BeadId, message: &str) -> Result<String, GitError>;

    async fn push(&self, bead_id: &BeadId) -> Result<(), GitError>;

    async fn create_branch(&self, bead_id: &BeadId, name: &str) -> Result<(), GitError>;

    async fn create_pr(&self, bead_id: &BeadId, title: &str, body: &str) -> Result<String, GitError>;
}

/// Swallows every operation. Used when a project has no git backing
/// (e.g. a purely exploratory bead) so the commit serializer still has
/// a collaborator to call through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGitOperator;

#[async_trait]
impl GitOperator for NoopGitOperator {
    async fn status(&self, _bead_id: &BeadId) -> Result<GitStatus, GitError> {
        Ok(GitStatus::default())
    }

    async fn diff(&self, _bead_id: &BeadId) -> Result<String, GitError> {
        Ok(String::new())
    }

    async fn commit(&self, _bead_id: &BeadId, _message: &str) -> Result<String, GitError> {
        Ok(String::new())
    }

    async fn push(&self, _bead_id: &BeadId) -> Result<(), GitError> {
        Ok(())
    }

    async fn create_branch(&self, _bead_id: &BeadId, _name: &str) -> Result<(), GitError> {
        Ok(())
    }

    async fn create_pr(&self, _bead_id: &BeadId, _title: &str, _body: &str) -> Result<String, GitError> {
        Ok(String::new())
    }
}

#[cfg(test)]
#[path = "git_operator_tests.rs"]
mod tests;
