//! Debug channels
//!
//! A [`Channel`] is the per-namespace handle returned by a [`Registry`]. It is
//! cheap to clone; clones share state. A channel is either active or destroyed:
//! after [`Channel::destroy`] every `log`/`extend` call fails with
//! [`DebugError::ChannelDestroyed`].
//!
//! # Example
//!
//! ```
//! use nsdebug::{Arg, Registry, RegistryConfig};
//!
//! let registry = Registry::empty(RegistryConfig::default().with_format("%n %m"));
//! registry.enable("worker:*")?;
//!
//! let worker = registry.get_or_create("worker");
//! let a = worker.extend("a")?;
//! assert_eq!(a.namespace(), "worker:a");
//! assert!(a.enabled());
//! assert!(!worker.enabled());
//! a.log(vec![Arg::from("doing lots of uninteresting work")])?;
//! # Ok::<(), nsdebug::DebugError>(())
//! ```

use crate::arg::Arg;
use crate::error::{DebugError, Result};
use crate::format::{self, DirectiveTable, FormatContext};
use crate::registry::{lock, Registry, RegistryInner};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Sink receiving the expanded arguments of an enabled call
pub type LogFn = Arc<dyn Fn(&[Arg]) + Send + Sync>;

/// Wrap a closure as a [`LogFn`]
pub fn sink_fn(f: impl Fn(&[Arg]) + Send + Sync + 'static) -> LogFn {
    Arc::new(f)
}

/// Sink writing the arguments, space separated, as one line on stderr
pub fn stderr_sink() -> LogFn {
    sink_fn(|args| {
        let line = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    })
}

/// Mutable per-channel settings and timing
struct ChannelState {
    format: String,
    color: u8,
    use_colors: bool,
    log: Option<LogFn>,
    prev: Option<DateTime<Utc>>,
    diff_ms: i64,
}

pub(crate) struct ChannelInner {
    namespace: String,
    enabled: AtomicBool,
    destroyed: AtomicBool,
    state: Mutex<ChannelState>,
    registry: Weak<RegistryInner>,
}

/// Handle to one namespace's debug output
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    pub(crate) fn new(
        namespace: &str,
        enabled: bool,
        format: String,
        color: u8,
        use_colors: bool,
        registry: Weak<RegistryInner>,
    ) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                namespace: namespace.to_string(),
                enabled: AtomicBool::new(enabled),
                destroyed: AtomicBool::new(false),
                state: Mutex::new(ChannelState {
                    format,
                    color,
                    use_colors,
                    log: None,
                    prev: None,
                    diff_ms: 0,
                }),
                registry,
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    pub fn enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Force the enabled flag; the next `enable()`/`disable()` on the registry recomputes it
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    pub fn color(&self) -> u8 {
        lock(&self.inner.state).color
    }

    pub fn set_color(&self, color: u8) {
        lock(&self.inner.state).color = color;
    }

    pub fn use_colors(&self) -> bool {
        lock(&self.inner.state).use_colors
    }

    pub fn set_use_colors(&self, use_colors: bool) {
        lock(&self.inner.state).use_colors = use_colors;
    }

    pub fn format(&self) -> String {
        lock(&self.inner.state).format.clone()
    }

    pub fn set_format(&self, format: impl Into<String>) {
        lock(&self.inner.state).format = format.into();
    }

    /// Channel-specific sink; `None` means the registry default is used
    pub fn log_sink(&self) -> Option<LogFn> {
        lock(&self.inner.state).log.clone()
    }

    pub fn set_log_sink(&self, log: Option<LogFn>) {
        lock(&self.inner.state).log = log;
    }

    /// Milliseconds between the last two enabled calls
    pub fn diff_ms(&self) -> i64 {
        lock(&self.inner.state).diff_ms
    }

    /// Whether two handles refer to the same channel instance
    pub fn same_instance(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registry that created this channel, if it is still alive
    pub fn registry(&self) -> Option<Registry> {
        self.inner.registry.upgrade().map(Registry::from_inner)
    }

    /// Emit one call
    ///
    /// A disabled channel does nothing (no timestamp update, no sink call).
    /// An enabled one expands its template and hands the result to its sink.
    pub fn log(&self, args: Vec<Arg>) -> Result<()> {
        self.ensure_active("log")?;
        if !self.enabled() {
            return Ok(());
        }

        let registry = self.registry();
        let now = Utc::now();
        let (template, diff_ms, color, use_colors, log) = {
            let mut state = lock(&self.inner.state);
            let diff_ms = state
                .prev
                .map(|prev| (now - prev).num_milliseconds())
                .unwrap_or(0);
            state.prev = Some(now);
            state.diff_ms = diff_ms;
            (
                state.format.clone(),
                diff_ms,
                state.color,
                state.use_colors,
                state.log.clone(),
            )
        };

        let directives = match &registry {
            Some(registry) => registry.directives(),
            None => Arc::new(DirectiveTable::with_builtins()),
        };
        let ctx = FormatContext {
            namespace: self.namespace(),
            diff_ms,
            now,
            color,
            use_colors,
            directives: &directives,
        };
        let out = format::expand(&ctx, &template, args)?;

        let sink = log
            .or_else(|| registry.as_ref().map(Registry::default_log_sink))
            .unwrap_or_else(stderr_sink);
        sink(&out);
        Ok(())
    }

    /// Child channel named `<namespace>:<suffix>`, sharing this channel's sink
    pub fn extend(&self, suffix: &str) -> Result<Channel> {
        self.extend_with(suffix, ":")
    }

    /// Child channel named `<namespace><delimiter><suffix>`, sharing this channel's sink
    pub fn extend_with(&self, suffix: &str, delimiter: &str) -> Result<Channel> {
        self.ensure_active("extend")?;
        let registry = self.registry().ok_or_else(|| DebugError::RegistryDropped {
            namespace: self.namespace().to_string(),
        })?;

        let child = registry.get_or_create(&format!("{}{}{}", self.namespace(), delimiter, suffix));
        child.set_log_sink(self.log_sink());
        Ok(child)
    }

    /// Remove this channel from its registry and poison the handle
    ///
    /// Returns `Ok(true)` if this instance was the registered one and got
    /// removed, `Ok(false)` if its name was already free. Fails with
    /// [`DebugError::StaleDestroy`] if a different live channel now owns the
    /// name.
    pub fn destroy(&self) -> Result<bool> {
        let removed = match self.inner.registry.upgrade() {
            Some(inner) => Registry::from_inner(inner).remove_channel(self)?,
            None => false,
        };

        self.inner.destroyed.store(true, Ordering::Release);
        // Keep the flag on so later calls reach the destroyed check instead of no-oping
        self.set_enabled(true);
        tracing::debug!(namespace = self.namespace(), removed, "destroyed debug channel");
        Ok(removed)
    }

    fn ensure_active(&self, operation: &'static str) -> Result<()> {
        if self.is_destroyed() {
            return Err(DebugError::ChannelDestroyed {
                operation,
                namespace: self.namespace().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("namespace", &self.namespace())
            .field("enabled", &self.enabled())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
