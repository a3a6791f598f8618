//! Log call arguments
//!
//! A channel call takes a heterogeneous list of values. Only [`Arg::Text`]
//! counts as textual: a non-text first argument is inspected rather than used
//! as the message format.

use serde::Serialize;
use std::fmt;

/// Error-like argument
///
/// Coerces to its stack text, or `"<name>: <message>"` when there is no stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorArg {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorArg {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Text used in place of the error when it is the message argument
    pub fn coerce(&self) -> String {
        match &self.stack {
            Some(stack) => stack.clone(),
            None => format!("{}: {}", self.name, self.message),
        }
    }
}

/// One argument of a channel call, or one element of an expanded output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    Text(String),
    Value(serde_json::Value),
    Error(ErrorArg),
}

impl Arg {
    /// Build an error argument from any std error, listing its `source()` chain
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut arg = ErrorArg::new("Error", err.to_string());
        let mut source = err.source();
        if source.is_some() {
            let mut stack = arg.coerce();
            while let Some(cause) = source {
                stack.push_str("\n    caused by: ");
                stack.push_str(&cause.to_string());
                source = cause.source();
            }
            arg.stack = Some(stack);
        }
        Arg::Error(arg)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Arg::Text(_))
    }

    /// Replace an error with its stack/description text
    pub fn coerce(self) -> Self {
        match self {
            Arg::Error(err) => Arg::Text(err.coerce()),
            other => other,
        }
    }

    /// Single-line structured rendering (text is quoted)
    pub fn inspect(&self) -> String {
        match self {
            Arg::Text(s) => format!("{:?}", s),
            Arg::Value(v) => v.to_string(),
            Arg::Error(err) => err.coerce(),
        }
    }

    /// Multi-line structured rendering
    pub fn inspect_pretty(&self) -> String {
        match self {
            Arg::Value(v) if v.is_object() || v.is_array() => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            other => other.inspect(),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(s) => f.write_str(s),
            Arg::Value(serde_json::Value::String(s)) => f.write_str(s),
            Arg::Value(v) => write!(f, "{}", v),
            Arg::Error(err) => f.write_str(&err.coerce()),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<serde_json::Value> for Arg {
    fn from(v: serde_json::Value) -> Self {
        Arg::Value(v)
    }
}

impl From<ErrorArg> for Arg {
    fn from(err: ErrorArg) -> Self {
        Arg::Error(err)
    }
}

impl From<anyhow::Error> for Arg {
    fn from(err: anyhow::Error) -> Self {
        let mut arg = ErrorArg::new("Error", err.to_string());
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            arg.stack = Some(format!("{}\n{}", arg.coerce(), backtrace));
        }
        Arg::Error(arg)
    }
}

macro_rules! impl_from_json {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::Value(serde_json::Value::from(v))
                }
            }
        )*
    };
}

impl_from_json!(bool, i32, i64, u32, u64, usize, f64);
