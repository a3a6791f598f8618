//! nsdebug - namespace-scoped debug channels
//!
//! Programs create named channels (`"worker:a"`, `"http:server"`) and turn
//! their output on and off at runtime with an enable pattern:
//!
//! - tokens are separated by commas or whitespace
//! - `*` matches any run of characters, everything else is literal
//! - a leading `-` excludes, and exclusions always win
//!
//! Each enabled call expands the channel's format template (`%n`, `%m`, `%+`,
//! `%{...}`, ...) and hands the result to a sink.
//!
//! # Example
//!
//! ```
//! use nsdebug::{sink_fn, Arg, Registry, RegistryConfig};
//! use std::sync::{Arc, Mutex};
//!
//! let registry = Registry::empty(RegistryConfig::default().with_format("%n %m"));
//! registry.enable("test,abc*,-abc")?;
//! assert!(registry.is_enabled("test"));
//! assert!(!registry.is_enabled("abc"));
//! assert!(registry.is_enabled("abcd"));
//!
//! let lines = Arc::new(Mutex::new(Vec::new()));
//! let sink = lines.clone();
//! let log = registry.get_or_create("test");
//! log.set_log_sink(Some(sink_fn(move |args| {
//!     let line: Vec<String> = args.iter().map(|a| a.to_string()).collect();
//!     sink.lock().unwrap().push(line.concat());
//! })));
//! log.log(vec![Arg::from("answer=%j"), Arg::from(42)])?;
//! assert_eq!(lines.lock().unwrap()[0], "test answer=42");
//!
//! assert_eq!(registry.disable(), "test,abc*,-abc");
//! # Ok::<(), nsdebug::DebugError>(())
//! ```
//!
//! A process-wide registry configured from `DEBUG`, `DEBUG_COLORS` and
//! `DEBUG_FORMAT` backs the free functions [`debug`], [`enable`], [`disable`]
//! and [`enabled`].

pub mod arg;
pub mod channel;
pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod humanize;
pub mod pattern;
pub mod registry;
pub mod store;

pub use arg::{Arg, ErrorArg};
pub use channel::{sink_fn, stderr_sink, Channel, LogFn};
pub use config::RegistryConfig;
pub use error::{DebugError, Result};
pub use format::{DirectiveTable, Expansion, FormatContext, PendingArgs, PrimaryDirective};
pub use pattern::{Matcher, PatternSet};
pub use registry::{EnableOptions, Registry};
pub use store::{EnvStore, MemoryStore, NullStore, PatternStore};

use once_cell::sync::Lazy;

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(Registry::from_env);

/// Process-wide registry, initialised from the environment on first use
pub fn registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// Channel for `namespace` in the process-wide registry
pub fn debug(namespace: &str) -> Channel {
    registry().get_or_create(namespace)
}

/// Apply an enable pattern to the process-wide registry
pub fn enable(pattern: &str) -> Result<()> {
    registry().enable(pattern)
}

/// Apply an enable pattern to the process-wide registry with explicit options
pub fn enable_with(pattern: &str, options: EnableOptions) -> Result<()> {
    registry().enable_with(pattern, options)
}

/// Clear the process-wide patterns, returning the string that restores them
pub fn disable() -> String {
    registry().disable()
}

/// Whether `namespace` is enabled in the process-wide registry
pub fn enabled(namespace: &str) -> bool {
    registry().is_enabled(namespace)
}
