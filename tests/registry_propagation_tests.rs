// Registry: pattern propagation to live channels, append modes, disable/restore

use nsdebug::{EnableOptions, MemoryStore, PatternStore, Registry, RegistryConfig};
use std::sync::Arc;

fn registry() -> Registry {
    Registry::empty(RegistryConfig::default())
}

/// Test that enable() flips channels created before it
#[test]
fn test_enable_updates_existing_channels() {
    let registry = registry();
    let a = registry.get_or_create("test:12345");
    let b = registry.get_or_create("test:67890");

    registry.enable("test:12345").unwrap();
    assert!(a.enabled());
    assert!(!b.enabled());

    registry.enable("test:*").unwrap();
    assert!(a.enabled());
    assert!(b.enabled());
}

/// Test that enabling without options keeps the previous tokens
#[test]
fn test_default_enable_appends() {
    let registry = registry();
    registry.enable("abc:*").unwrap();
    registry.enable("def").unwrap();

    assert!(registry.is_enabled("abc:x"));
    assert!(registry.is_enabled("def"));
    assert_eq!(registry.includes(), vec!["^abc:.*?$", "^def$"]);
}

/// Test that append = false starts from empty lists
#[test]
fn test_replace_clears_previous_tokens() {
    let registry = registry();
    registry.enable("abc:*,-abc:skip").unwrap();
    registry
        .enable_with("def", EnableOptions::replace())
        .unwrap();

    assert!(!registry.is_enabled("abc:x"));
    assert!(registry.is_enabled("def"));
    assert!(registry.excludes().is_empty());
}

/// Test that append = true behaves like the default
#[test]
fn test_explicit_append() {
    let registry = registry();
    registry.enable("one").unwrap();
    registry
        .enable_with("two", EnableOptions::append())
        .unwrap();
    assert!(registry.is_enabled("one"));
    assert!(registry.is_enabled("two"));
}

/// Test that disable() returns a string that restores the same state
#[test]
fn test_disable_round_trip() {
    let registry = registry();
    registry.enable("test,abc*,-abc,worker:*").unwrap();
    let includes = registry.includes();
    let excludes = registry.excludes();

    let restored = registry.disable();
    assert_eq!(restored, "test,abc*,worker:*,-abc");
    assert!(!registry.is_enabled("test"));
    assert!(!registry.is_enabled("*"));
    assert!(registry.includes().is_empty());

    registry.enable(&restored).unwrap();
    assert_eq!(registry.includes(), includes);
    assert_eq!(registry.excludes(), excludes);
}

/// Test that disable() turns off every live channel
#[test]
fn test_disable_turns_channels_off() {
    let registry = registry();
    registry.enable("*").unwrap();
    let channel = registry.get_or_create("anything");
    assert!(channel.enabled());

    assert_eq!(registry.disable(), "*");
    assert!(!channel.enabled());
}

/// Test that disable() on an empty registry returns an empty string
#[test]
fn test_disable_when_nothing_enabled() {
    let registry = registry();
    assert_eq!(registry.disable(), "");
}

/// Test that every enable() call reaches the store
#[test]
fn test_store_receives_each_pattern() {
    let store = Arc::new(MemoryStore::new(None));
    let registry = Registry::new(RegistryConfig::default(), SharedStore(store.clone())).unwrap();
    registry.enable("a").unwrap();
    registry
        .enable_with("b", EnableOptions::replace())
        .unwrap();

    assert_eq!(store.saved(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(registry.last_pattern().as_deref(), Some("b"));
}

/// Test that a pattern loaded from the store is live at construction
#[test]
fn test_store_pattern_enabled_on_new() {
    let registry =
        Registry::new(RegistryConfig::default(), MemoryStore::new(Some("boot:*,-boot:x"))).unwrap();
    assert!(registry.is_enabled("boot:y"));
    assert!(!registry.is_enabled("boot:x"));
    assert!(registry.get_or_create("boot:y").enabled());
}

/// Test that registries do not share state
#[test]
fn test_registries_are_independent() {
    let one = registry();
    let two = registry();
    one.enable("shared").unwrap();
    assert!(one.is_enabled("shared"));
    assert!(!two.is_enabled("shared"));

    let a = one.get_or_create("shared");
    let b = two.get_or_create("shared");
    assert!(!a.same_instance(&b));
}

/// Forward a shared MemoryStore so the test can inspect it after handing it over
struct SharedStore(Arc<MemoryStore>);

impl PatternStore for SharedStore {
    fn load(&self) -> Option<String> {
        self.0.load()
    }

    fn save(&self, pattern: &str) {
        self.0.save(pattern);
    }
}
