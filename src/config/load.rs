//! Configuration Loading
//!
//! Parses a located configuration file into its normalized form:
//! - A manifest (`package.json`) contributes the value under its
//!   `requireRewrite` key plus the declared package `name`.
//! - A dedicated file (`require-rewrite.json` / dotfile variant) is
//!   the whole configuration and carries no name.
//!
//! Sections stay loosely typed (`serde_json::Value`): their shapes are
//! validated when the configuration is applied to a context, keeping
//! parse errors and validation errors distinct.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{ConfigError, ConfigResult, MANIFEST_FILE, MANIFEST_KEY};

/// The four optional sections of a rewrite configuration.
///
/// Section shapes are validated by `apply_config`, not here; only the
/// top-level "is an object" constraint is enforced at parse time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewriteConfig {
    /// Search paths prepended to the host's lookup list.
    #[serde(default)]
    pub before: Option<Value>,

    /// Search paths appended to the host's lookup list.
    #[serde(default)]
    pub after: Option<Value>,

    /// Mixed list split into before/after by the `%` divider.
    #[serde(default)]
    pub include: Option<Value>,

    /// Ordered rewrite-rule specs, applied in array order.
    #[serde(default)]
    pub map: Option<Value>,
}

/// A loaded configuration plus the declared package name, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The rewrite configuration section.
    pub config: RewriteConfig,

    /// Package name from the manifest; `None` for dedicated config files.
    pub name: Option<String>,
}

/// Load a configuration file located by `find_config_file`.
///
/// The manifest key is validated here even though the locator already
/// filters for it, so direct callers get the same contract.
pub fn load_config(path: &Path) -> ConfigResult<LoadedConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;

    let is_manifest = path
        .file_name()
        .is_some_and(|name| name == MANIFEST_FILE);

    if is_manifest {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let section = value
            .get(MANIFEST_KEY)
            .ok_or_else(|| ConfigError::MissingKey(path.to_path_buf()))?;
        let config = parse_section(path, section)?;
        Ok(LoadedConfig { config, name })
    } else {
        let config = parse_section(path, &value)?;
        Ok(LoadedConfig { config, name: None })
    }
}

fn parse_section(path: &Path, value: &Value) -> ConfigResult<RewriteConfig> {
    serde_json::from_value(value.clone())
        .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
}
