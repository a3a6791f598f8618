//! Namespace registry
//!
//! Holds the active include/exclude matchers and every live channel, keyed by
//! namespace. Pattern changes recompute the `enabled` flag of every live
//! channel.
//!
//! Writers (`enable`, `disable`, `get_or_create`, `destroy`) are serialized by
//! the channel-map mutex. Matchers are published as an immutable
//! `Arc<PatternSet>` snapshot, so `is_enabled` only holds a read lock long
//! enough to clone the `Arc`, and a disabled channel call never locks at all.

use crate::arg::Arg;
use crate::channel::{stderr_sink, Channel, LogFn};
use crate::color::select_color;
use crate::config::RegistryConfig;
use crate::error::{DebugError, Result};
use crate::format::{DirectiveTable, Expansion, FormatContext, PrimaryDirective};
use crate::pattern::PatternSet;
use crate::store::{EnvStore, NullStore, PatternStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(rw: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rw.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(rw: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rw.write().unwrap_or_else(PoisonError::into_inner)
}

/// How `enable` combines the new pattern with the current matchers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnableOptions {
    /// `Some(false)` clears the current matchers first; `None` and `Some(true)`
    /// apply the new tokens on top of them
    pub append: Option<bool>,
}

impl EnableOptions {
    pub fn replace() -> Self {
        Self {
            append: Some(false),
        }
    }

    pub fn append() -> Self {
        Self { append: Some(true) }
    }
}

pub(crate) struct RegistryInner {
    patterns: RwLock<Arc<PatternSet>>,
    channels: Mutex<HashMap<String, Channel>>,
    directives: RwLock<Arc<DirectiveTable>>,
    default_log: RwLock<LogFn>,
    last_pattern: Mutex<Option<String>>,
    config: RegistryConfig,
    store: Box<dyn PatternStore>,
}

/// Shared handle to a set of channels and the patterns that enable them
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Build a registry and enable whatever pattern `store` loads
    pub fn new(config: RegistryConfig, store: impl PatternStore + 'static) -> Result<Self> {
        let registry = Self::unloaded(config, Box::new(store));
        if let Some(pattern) = registry.inner.store.load() {
            registry.enable(&pattern)?;
        }
        Ok(registry)
    }

    /// Registry with nothing enabled and no persistence
    pub fn empty(config: RegistryConfig) -> Self {
        Self::unloaded(config, Box::new(NullStore))
    }

    /// Registry configured from the environment, enabling `$DEBUG`
    pub fn from_env() -> Self {
        let registry = Self::unloaded(RegistryConfig::from_env(), Box::new(EnvStore::default()));
        if let Some(pattern) = registry.inner.store.load() {
            if let Err(e) = registry.enable(&pattern) {
                tracing::warn!("Ignoring initial debug pattern {:?}: {}", pattern, e);
            }
        }
        registry
    }

    fn unloaded(config: RegistryConfig, store: Box<dyn PatternStore>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                patterns: RwLock::new(Arc::new(PatternSet::default())),
                channels: Mutex::new(HashMap::new()),
                directives: RwLock::new(Arc::new(DirectiveTable::with_builtins())),
                default_log: RwLock::new(stderr_sink()),
                last_pattern: Mutex::new(None),
                config,
                store,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Channel for `namespace`, created on first request
    pub fn get_or_create(&self, namespace: &str) -> Channel {
        let mut channels = lock(&self.inner.channels);
        if let Some(channel) = channels.get(namespace) {
            return channel.clone();
        }

        let config = &self.inner.config;
        let enabled = self.is_enabled(namespace);
        let channel = Channel::new(
            namespace,
            enabled,
            config.format.clone(),
            select_color(namespace, &config.palette),
            config.use_colors,
            Arc::downgrade(&self.inner),
        );
        channels.insert(namespace.to_string(), channel.clone());
        tracing::debug!(namespace, enabled, "created debug channel");
        channel
    }

    /// Live channel for `namespace`, without creating one
    pub fn channel(&self, namespace: &str) -> Option<Channel> {
        lock(&self.inner.channels).get(namespace).cloned()
    }

    /// Names of all live channels, sorted
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.inner.channels).keys().cloned().collect();
        names.sort();
        names
    }

    /// Apply an enable pattern on top of the current one
    pub fn enable(&self, pattern: &str) -> Result<()> {
        self.enable_with(pattern, EnableOptions::default())
    }

    /// Apply an enable pattern and recompute every live channel
    ///
    /// The raw pattern is handed to the store and kept as [`Registry::last_pattern`]
    /// before it is compiled.
    pub fn enable_with(&self, pattern: &str, options: EnableOptions) -> Result<()> {
        self.inner.store.save(pattern);
        *lock(&self.inner.last_pattern) = Some(pattern.to_string());

        let channels = lock(&self.inner.channels);
        let mut next = match options.append {
            Some(false) => PatternSet::default(),
            _ => PatternSet::clone(&self.patterns()),
        };
        next.apply(pattern)?;

        let next = Arc::new(next);
        *write(&self.inner.patterns) = next.clone();
        for channel in channels.values() {
            channel.set_enabled(next.is_enabled(channel.namespace()));
        }

        tracing::debug!(
            pattern,
            includes = next.includes().len(),
            excludes = next.excludes().len(),
            channels = channels.len(),
            "enabled debug namespaces"
        );
        Ok(())
    }

    /// Clear every matcher and return the pattern that restores them
    pub fn disable(&self) -> String {
        let channels = lock(&self.inner.channels);
        let previous = std::mem::take(&mut *write(&self.inner.patterns));
        for channel in channels.values() {
            channel.set_enabled(false);
        }

        let namespaces = previous.to_namespaces();
        tracing::debug!(namespaces = %namespaces, channels = channels.len(), "disabled debug namespaces");
        namespaces
    }

    /// Whether a namespace would be enabled under the current matchers
    ///
    /// `"*"` asks whether any include matcher exists.
    pub fn is_enabled(&self, namespace: &str) -> bool {
        self.patterns().is_enabled(namespace)
    }

    /// Current matcher snapshot
    pub fn patterns(&self) -> Arc<PatternSet> {
        read(&self.inner.patterns).clone()
    }

    /// Anchored include patterns, in order
    pub fn includes(&self) -> Vec<String> {
        self.patterns()
            .includes()
            .iter()
            .map(|m| m.pattern().to_string())
            .collect()
    }

    /// Anchored exclude patterns, in order
    pub fn excludes(&self) -> Vec<String> {
        self.patterns()
            .excludes()
            .iter()
            .map(|m| m.pattern().to_string())
            .collect()
    }

    /// Raw string most recently passed to `enable`
    pub fn last_pattern(&self) -> Option<String> {
        lock(&self.inner.last_pattern).clone()
    }

    /// Directive table used by this registry's channels
    pub fn directives(&self) -> Arc<DirectiveTable> {
        read(&self.inner.directives).clone()
    }

    /// Bind a new primary directive for all channels of this registry
    pub fn register_directive(&self, token: char, directive: PrimaryDirective) -> Result<()> {
        let mut guard = write(&self.inner.directives);
        let mut table = DirectiveTable::clone(&guard);
        table.register(token, directive)?;
        *guard = Arc::new(table);
        Ok(())
    }

    /// Bind a new meta directive for all channels of this registry
    pub fn register_meta(
        &self,
        token: char,
        f: impl Fn(&FormatContext<'_>, char, Arg) -> Arg + Send + Sync + 'static,
    ) -> Result<()> {
        let mut guard = write(&self.inner.directives);
        let mut table = DirectiveTable::clone(&guard);
        table.register_meta(token, f)?;
        *guard = Arc::new(table);
        Ok(())
    }

    /// Replace the `%{...}` handler for all channels of this registry
    pub fn set_time_directive(
        &self,
        f: impl Fn(&FormatContext<'_>, &str) -> Expansion + Send + Sync + 'static,
    ) {
        let mut guard = write(&self.inner.directives);
        let mut table = DirectiveTable::clone(&guard);
        table.set_time(f);
        *guard = Arc::new(table);
    }

    /// Sink used by channels without their own
    pub fn default_log_sink(&self) -> LogFn {
        read(&self.inner.default_log).clone()
    }

    pub fn set_default_log_sink(&self, log: LogFn) {
        *write(&self.inner.default_log) = log;
    }

    /// Unregister `channel` if it is the live instance for its namespace
    pub(crate) fn remove_channel(&self, channel: &Channel) -> Result<bool> {
        let mut channels = lock(&self.inner.channels);
        match channels.get(channel.namespace()) {
            Some(current) if current.same_instance(channel) => {
                channels.remove(channel.namespace());
                Ok(true)
            }
            Some(_) => Err(DebugError::StaleDestroy {
                namespace: channel.namespace().to_string(),
            }),
            None => Ok(false),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("includes", &self.includes())
            .field("excludes", &self.excludes())
            .field("namespaces", &self.namespaces())
            .finish()
    }
}
