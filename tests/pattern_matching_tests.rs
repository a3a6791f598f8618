// Enable-pattern matching: wildcards, exclusions, cancellation and escaping

use nsdebug::{PatternSet, Registry, RegistryConfig};

fn registry() -> Registry {
    Registry::empty(RegistryConfig::default())
}

/// Test the basic include/exclude combination
#[test]
fn test_include_wildcard_and_exclude() {
    let registry = registry();
    registry.enable("test,abc*,-abc").unwrap();

    assert!(registry.is_enabled("test"));
    assert!(registry.is_enabled("abc123"));
    assert!(!registry.is_enabled("abc"), "exclusion must beat abc*");
    assert!(!registry.is_enabled("tes"));
}

/// Test that whitespace and commas both separate tokens
#[test]
fn test_whitespace_and_comma_separators() {
    let registry = registry();
    registry.enable(" a ,,  b\tc\n").unwrap();

    assert!(registry.is_enabled("a"));
    assert!(registry.is_enabled("b"));
    assert!(registry.is_enabled("c"));
    assert_eq!(registry.includes(), vec!["^a$", "^b$", "^c$"]);
}

/// Test that matches are anchored at both ends
#[test]
fn test_matching_is_anchored() {
    let registry = registry();
    registry.enable("worker:a").unwrap();

    assert!(registry.is_enabled("worker:a"));
    assert!(!registry.is_enabled("worker:ab"));
    assert!(!registry.is_enabled("my-worker:a"));
}

/// Test that the bare wildcard asks whether anything is enabled
#[test]
fn test_star_query_means_any_include() {
    let registry = registry();
    assert!(!registry.is_enabled("*"));

    registry.enable("-noisy").unwrap();
    assert!(!registry.is_enabled("*"), "excludes alone enable nothing");

    registry.enable("x").unwrap();
    assert!(registry.is_enabled("*"));
}

/// Test that regex metacharacters in tokens are taken literally
#[test]
fn test_regex_characters_are_literal() {
    let registry = registry();
    registry
        .enable("test\\ns,a.b,(x),[y],{z},p+q,r?s,t|u,v^w,$d,-")
        .unwrap();

    for name in [
        "test\\ns", "a.b", "(x)", "[y]", "{z}", "p+q", "r?s", "t|u", "v^w", "$d",
    ] {
        assert!(registry.is_enabled(name), "{name} should match itself");
    }
    assert!(!registry.is_enabled("aXb"), "'.' must not act as a wildcard");
    assert!(!registry.is_enabled("ppq"), "'+' must not act as a quantifier");
    assert!(!registry.is_enabled("t"), "'|' must not act as alternation");
}

/// Test that a wildcard matches the empty run too
#[test]
fn test_wildcard_matches_empty_run() {
    let registry = registry();
    registry.enable("abc*").unwrap();
    assert!(registry.is_enabled("abc"));
    assert!(registry.is_enabled("abc:def:ghi"));

    registry.enable("*:end").unwrap();
    assert!(registry.is_enabled(":end"));
    assert!(registry.is_enabled("front:end"));
}

/// Test that later tokens cancel earlier tokens of the opposite polarity
#[test]
fn test_opposite_tokens_cancel() {
    let set = PatternSet::compile("a,-a,a").unwrap();
    assert!(set.is_enabled("a"));
    assert_eq!(set.to_namespaces(), "a");

    let set = PatternSet::compile("-b,b,-b").unwrap();
    assert!(!set.is_enabled("b"));
    assert_eq!(set.includes().len(), 0);
    assert_eq!(set.to_namespaces(), "-b");
}

/// Test that cancellation across calls honours the current lists
#[test]
fn test_cancellation_across_enable_calls() {
    let registry = registry();
    registry.enable("test:*").unwrap();
    registry.enable("-test:*").unwrap();
    assert!(!registry.is_enabled("test:x"));
    assert!(registry.includes().is_empty());

    registry.enable("test:*").unwrap();
    assert!(registry.is_enabled("test:x"));
    assert!(registry.excludes().is_empty());
}

/// Test an empty or separator-only pattern
#[test]
fn test_empty_pattern_enables_nothing() {
    let set = PatternSet::compile("  , ,").unwrap();
    assert!(set.is_empty());
    assert!(!set.is_enabled(""));
    assert!(!set.is_enabled("anything"));
    assert_eq!(set.to_namespaces(), "");
}

/// Test that a dot is literal while a star is a wildcard
#[test]
fn test_dot_literal_star_wildcard() {
    let registry = registry();
    registry.enable("a.c").unwrap();
    assert!(registry.is_enabled("a.c"));
    assert!(!registry.is_enabled("abc"));

    registry.enable("a*").unwrap();
    for name in ["a", "ab", "abc"] {
        assert!(registry.is_enabled(name), "{name} should match a*");
    }
}

/// Test that a later exclusion beats an earlier wildcard include
#[test]
fn test_exclusion_added_after_wildcard() {
    let registry = registry();
    let foo = registry.get_or_create("abc:foo");
    registry.enable("abc*").unwrap();
    assert!(registry.is_enabled("abc"));
    assert!(foo.enabled());

    registry.enable("-abc").unwrap();
    assert!(!registry.is_enabled("abc"));
    assert!(foo.enabled(), "abc:foo is still matched by abc*");
}

/// Test that enabling the empty string leaves nothing enabled
#[test]
fn test_empty_enable_is_not_star() {
    let registry = registry();
    registry.enable("").unwrap();
    assert!(!registry.is_enabled("*"));
}
