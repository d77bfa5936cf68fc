// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AutoBugRouter: rewrites a bead's title with an inferred role prefix
//! when the title matches a bug signature (spec §4.2).
//!
//! The rewrite is authoritative and irreversible (spec §9 open
//! question): the original title is not recoverable once overwritten.

const BUG_SIGNATURES: &[&str] = &["bug:", "fix:", "error:", "crash", "broken", "regression"];

/// True if `title` matches a recognized bug signature.
pub fn is_bug_signature(title: &str) -> bool {
    let lower = title.to_lowercase();
    BUG_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Rewrite `title` with a `[{role}]` prefix if it matches a bug
/// signature and doesn't already carry that prefix. Returns `None` when
/// no rewrite is needed.
pub fn rewrite_title_for_role(title: &str, role: &str) -> Option<String> {
    if !is_bug_signature(title) {
        return None;
    }
    let prefix = format!("[{role}]");
    if title.starts_with(&prefix) {
        return None;
    }
    Some(format!("{prefix} {title}"))
}

#[cfg(test)]
#[path = "auto_bug_router_tests.rs"]
mod tests;
