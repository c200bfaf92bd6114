//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Nothing in the mini-app waits by sleeping. Production code
//! waits on I/O and channels. Tests that need a request to stay in flight
//! use `MockTransport::hold` / `release` instead of timing.
//!
//! Both production and test sources are checked.

use architectural_enforcement::{load_sources, report, scan, FnContext, PRODUCTION_DIRS, TEST_DIRS};

fn sleep_rule(code: &str, _context: FnContext) -> Option<&'static str> {
    if code.contains("thread::sleep") {
        Some("Thread sleep")
    } else if code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")
    {
        Some("Timer sleep")
    } else {
        None
    }
}

/// Test that production code does not sleep
#[test]
fn test_no_sleep_in_production_code() {
    let sources = load_sources(PRODUCTION_DIRS, &[]);
    let violations = scan(&sources, true, sleep_rule);

    report(
        "CRITICAL: Sleep calls found in production code!",
        &violations,
        &["✅ Wait on the request future or a channel instead"],
    );
}

/// Test that tests synchronize without sleeping
#[test]
fn test_no_sleep_in_tests() {
    let mut sources = load_sources(TEST_DIRS, &[]);
    sources.extend(load_sources(PRODUCTION_DIRS, &[]));
    let violations = scan(&sources, false, sleep_rule);

    report(
        "Sleep used for synchronization in tests!",
        &violations,
        &["✅ Use MockTransport::hold() / release() or tokio::task::yield_now()"],
    );
}

#[test]
fn test_rule_ignores_yield() {
    assert_eq!(sleep_rule("tokio::task::yield_now().await;", FnContext::Async), None);
    assert!(sleep_rule("tokio::time::sleep(d).await;", FnContext::Async).is_some());
}
