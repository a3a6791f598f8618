//! Registry configuration
//!
//! Defaults can be overridden from the environment (`DEBUG_FORMAT`,
//! `DEBUG_COLORS`) or loaded from a TOML file:
//!
//! ```toml
//! format = "%n %m %+"
//! use_colors = false
//! palette = [6, 2, 3, 4, 5, 1]
//! ```

use crate::color::{self, DEFAULT_PALETTE};
use crate::error::{DebugError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default channel template: timestamp, bold colored namespace, message, colored delta
pub const DEFAULT_FORMAT: &str = "%{}%Cn%m%c+";

/// Environment variable overriding the channel template
pub const FORMAT_VAR: &str = "DEBUG_FORMAT";

/// Environment variable overriding color detection
pub const COLORS_VAR: &str = "DEBUG_COLORS";

/// Settings applied to every channel a registry creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Template for new channels
    pub format: String,

    /// Initial `use_colors` flag for new channels
    pub use_colors: bool,

    /// xterm-256 codes namespaces are hashed onto
    pub palette: Vec<u8>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            use_colors: false,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl RegistryConfig {
    /// Defaults, with colors on when stderr is a terminal, then env overrides
    pub fn from_env() -> Self {
        let mut config = Self {
            use_colors: color::stderr_supports_color(),
            ..Self::default()
        };

        if let Ok(format) = std::env::var(FORMAT_VAR) {
            if !format.is_empty() {
                config.format = format;
            }
        }

        if let Ok(value) = std::env::var(COLORS_VAR) {
            match color::parse_color_flag(&value) {
                Some(flag) => config.use_colors = flag,
                None => tracing::warn!("Ignoring {}={:?}: not a boolean", COLORS_VAR, value),
            }
        }

        config
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DebugError::Config(format!("Failed to parse registry config: {}", e)))
    }

    /// Load a TOML configuration file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DebugError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.format, DEFAULT_FORMAT);
        assert!(!config.use_colors);
        assert_eq!(config.palette.len(), 76);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RegistryConfig::from_toml_str("use_colors = true").unwrap();
        assert!(config.use_colors);
        assert_eq!(config.format, DEFAULT_FORMAT);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RegistryConfig::from_toml_str("use_colors = \"sometimes\"").unwrap_err();
        assert!(matches!(err, DebugError::Config(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "format = \"%n %m\"").unwrap();
        writeln!(file, "palette = [6, 2, 3]").unwrap();

        let config = RegistryConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.format, "%n %m");
        assert_eq!(config.palette, vec![6, 2, 3]);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = RegistryConfig::from_toml("/nonexistent/nsdebug.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
