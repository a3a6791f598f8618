// Process-wide registry and its DEBUG environment persistence
//
// All tests share one registry, so they run serially and restore it on exit.

use nsdebug::EnableOptions;
use serial_test::serial;

fn reset() {
    nsdebug::enable_with("", EnableOptions::replace()).unwrap();
}

/// Test that enable() is visible through the free functions and persisted to DEBUG
#[test]
#[serial]
fn test_global_enable_persists_to_env() {
    reset();
    nsdebug::enable("global:*,-global:quiet").unwrap();

    assert!(nsdebug::enabled("global:a"));
    assert!(!nsdebug::enabled("global:quiet"));
    assert_eq!(
        std::env::var("DEBUG").as_deref(),
        Ok("global:*,-global:quiet")
    );

    reset();
    assert!(std::env::var("DEBUG").is_err(), "empty pattern removes the variable");
}

/// Test that debug() returns the same channel for the same namespace
#[test]
#[serial]
fn test_global_debug_dedupes() {
    reset();
    let a = nsdebug::debug("global:dedupe");
    let b = nsdebug::debug("global:dedupe");
    assert!(a.same_instance(&b));
    assert!(nsdebug::registry()
        .namespaces()
        .contains(&"global:dedupe".to_string()));
    assert!(a.destroy().unwrap());
}

/// Test that disable() returns the restoring string and silences channels
#[test]
#[serial]
fn test_global_disable_and_restore() {
    reset();
    let channel = nsdebug::debug("global:restore");
    nsdebug::enable("global:restore").unwrap();
    assert!(channel.enabled());

    let previous = nsdebug::disable();
    assert_eq!(previous, "global:restore");
    assert!(!channel.enabled());

    nsdebug::enable(&previous).unwrap();
    assert!(channel.enabled());
    reset();
}
