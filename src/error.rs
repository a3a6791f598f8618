//! Error taxonomy for debug channels
//!
//! Every variant here is a configuration error: it is raised synchronously and
//! never caught inside the crate. Data problems (e.g. a value that cannot be
//! rendered as JSON) are contained by the directive that hit them and never
//! show up as a `DebugError`.

use thiserror::Error;

/// Errors raised by the pattern compiler, registry, format engine and channels
#[derive(Error, Debug)]
pub enum DebugError {
    #[error("Unsupported format specification: '{token}'")]
    UnsupportedFormat { token: String },

    #[error("Unsupported meta format: '{meta}' in the format specification '{token}'")]
    UnsupportedMeta { meta: char, token: String },

    #[error("{operation}() invoked after debug instance '{namespace}' has been destroyed")]
    ChannelDestroyed {
        operation: &'static str,
        namespace: String,
    },

    #[error("Trying to destroy an already destroyed instance of '{namespace}'")]
    StaleDestroy { namespace: String },

    #[error("Invalid directive token '{token}': expected a single character of [A-Za-z+]")]
    InvalidDirective { token: char },

    #[error("Directive '{token}' is already registered")]
    DirectiveAlreadyBound { token: char },

    #[error("Invalid namespace pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Registry for '{namespace}' no longer exists")]
    RegistryDropped { namespace: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for debug channel operations
pub type Result<T> = std::result::Result<T, DebugError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_names_token() {
        let err = DebugError::UnsupportedFormat {
            token: "%q".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported format specification: '%q'");
    }

    #[test]
    fn test_unsupported_meta_names_both_parts() {
        let err = DebugError::UnsupportedMeta {
            meta: 'x',
            token: "%xn".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'x'"));
        assert!(msg.contains("'%xn'"));
    }

    #[test]
    fn test_destroyed_message_names_operation() {
        let err = DebugError::ChannelDestroyed {
            operation: "extend",
            namespace: "foo".to_string(),
        };
        assert!(err.to_string().starts_with("extend() invoked after"));
    }
}
