//! Where the enable pattern comes from at startup and where it is saved
//!
//! A registry calls [`PatternStore::load`] once when it is built and
//! [`PatternStore::save`] with the exact raw string on every `enable()`.

use std::sync::Mutex;

/// Environment variable read by the default store
pub const DEFAULT_PATTERN_VAR: &str = "DEBUG";

/// Source and sink for the raw enable pattern
pub trait PatternStore: Send + Sync {
    /// Initial pattern, if any
    fn load(&self) -> Option<String>;

    /// Persist the raw pattern passed to `enable()`
    fn save(&self, pattern: &str);
}

/// Store backed by a process environment variable
#[derive(Debug, Clone)]
pub struct EnvStore {
    var: String,
}

impl EnvStore {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvStore {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_VAR)
    }
}

impl PatternStore for EnvStore {
    fn load(&self) -> Option<String> {
        match std::env::var(&self.var) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", self.var, e);
                None
            }
        }
    }

    fn save(&self, pattern: &str) {
        // An empty pattern means "nothing enabled"; drop the variable rather than leave it blank
        if pattern.is_empty() {
            std::env::remove_var(&self.var);
        } else {
            std::env::set_var(&self.var, pattern);
        }
    }
}

/// Store that never loads and discards saves
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl PatternStore for NullStore {
    fn load(&self) -> Option<String> {
        None
    }

    fn save(&self, _pattern: &str) {}
}

/// In-memory store, handy for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    initial: Option<String>,
    saved: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            initial: initial.map(str::to_string),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Every pattern saved so far, oldest first
    pub fn saved(&self) -> Vec<String> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PatternStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.initial.clone()
    }

    fn save(&self, pattern: &str) {
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(pattern.to_string());
        }
    }
}
