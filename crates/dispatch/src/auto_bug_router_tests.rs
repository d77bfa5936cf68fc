// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn detects_bug_signature_case_insensitively() {
    assert!(is_bug_signature("BUG: login crashes"));
    assert!(is_bug_signature("Fix: stale cache"));
    assert!(is_bug_signature("app is broken on restart"));
    assert!(!is_bug_signature("Add new export endpoint"));
}

#[test]
fn rewrite_prefixes_role_once() {
    let rewritten = rewrite_title_for_role("bug: login crashes", "coder").unwrap();
    assert_eq!(rewritten, "[coder] bug: login crashes");
}

#[test]
fn rewrite_is_idempotent_once_prefix_present() {
    assert_eq!(rewrite_title_for_role("[coder] bug: login crashes", "coder"), None);
}

#[test]
fn no_rewrite_for_non_bug_titles() {
    assert_eq!(rewrite_title_for_role("Add new export endpoint", "coder"), None);
}
