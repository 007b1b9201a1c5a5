//! Rewrite Configuration
//!
//! Discovery, loading, and application of per-package rewrite
//! configuration:
//! - `locate` - Upward walk to the nearest governing config file
//! - `load` - Parse a located file into `{ config, name }`
//! - `apply` - Populate a `Context` from a parsed configuration
//!
//! "Not found" during discovery is a normal outcome; only parsing and
//! validation produce errors.

mod apply;
mod load;
mod locate;

pub use apply::{apply_config, INCLUDE_DIVIDER};
pub use load::{load_config, LoadedConfig, RewriteConfig};
pub use locate::{
    find_config_file, CONFIG_FILE, DEPENDENCY_DIR, DOT_CONFIG_FILE, MANIFEST_FILE, MANIFEST_KEY,
};

use std::path::PathBuf;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or applying configuration.
///
/// Resolution misses are *not* errors; they are signaled with `None`
/// through the rule chain.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Io(PathBuf, String),
    /// File content could not be parsed as JSON, or a section had the
    /// wrong top-level shape.
    Parse(PathBuf, String),
    /// A manifest was loaded as configuration but lacks the rewrite key.
    MissingKey(PathBuf),
    /// A section or rule spec failed validation.
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, err) => {
                write!(f, "Failed to read '{}': {}", path.display(), err)
            }
            ConfigError::Parse(path, err) => {
                write!(f, "Failed to parse '{}': {}", path.display(), err)
            }
            ConfigError::MissingKey(path) => {
                write!(
                    f,
                    "Manifest '{}' has no '{}' key",
                    path.display(),
                    MANIFEST_KEY
                )
            }
            ConfigError::Validation(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
