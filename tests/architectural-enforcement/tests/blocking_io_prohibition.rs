//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the mini-app core and shell MUST NOT block on
//! I/O. Controllers run on the same runtime as every pending request; one
//! blocking call stalls them all.
//! **Required**: `reqwest` async client, `tokio::fs`, `tokio::net`.
//! **Acceptable**: blocking calls in plain `fn`s that run before or outside the
//! runtime (config loading at startup), and test code.

use architectural_enforcement::{
    load_sources, report, scan, FnContext, PRODUCTION_DIRS, TEST_SUPPORT_FILES,
};

/// Blocking patterns and what they are
const BLOCKING: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("use std::fs", "Blocking file I/O import"),
    ("std::net::", "Blocking network I/O"),
    ("use std::net", "Blocking network I/O import"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
];

fn blocking_rule(code: &str, context: FnContext) -> Option<&'static str> {
    if code.contains("reqwest::blocking") {
        return Some("Blocking HTTP client");
    }
    if context == FnContext::Sync {
        return None;
    }
    if let Some((_, reason)) = BLOCKING.iter().find(|(pattern, _)| code.contains(pattern)) {
        return Some(reason);
    }
    if context == FnContext::Async && code.contains("std::io::stdin()") {
        return Some("Blocking stdin in async");
    }
    None
}

/// Test that production async code does not block on I/O
#[test]
fn test_no_blocking_io_in_production_code() {
    let sources = load_sources(PRODUCTION_DIRS, TEST_SUPPORT_FILES);
    assert!(!sources.is_empty(), "No production sources found");

    let violations = scan(&sources, true, blocking_rule);

    report(
        "CRITICAL: Blocking I/O found in async production code!",
        &violations,
        &[
            "✅ REQUIRED: reqwest async client, tokio::fs, tokio::net",
            "✅ ACCEPTABLE: plain fn before the runtime starts, test code",
        ],
    );
}

#[test]
fn test_rule_flags_fs_in_async() {
    assert_eq!(
        blocking_rule("let s = std::fs::read_to_string(p)?;", FnContext::Async),
        Some("Blocking file I/O")
    );
    assert_eq!(
        blocking_rule("let s = std::fs::read_to_string(p)?;", FnContext::Sync),
        None
    );
}

#[test]
fn test_rule_flags_blocking_reqwest_anywhere() {
    assert!(blocking_rule("let c = reqwest::blocking::Client::new();", FnContext::Sync).is_some());
}
