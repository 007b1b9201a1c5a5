//! Configuration Application
//!
//! Populates a `Context` from a parsed `RewriteConfig`:
//! - `before` / `after` entries resolve against the context root into
//!   the pre/post include lists
//! - `include` is one mixed list, split by the single `%` divider
//! - `map` entries register rules in array order, so later entries end
//!   up with higher precedence (the chain is LIFO)
//!
//! Application is not atomic: sections already processed stay applied
//! when a later section fails validation. Callers decide whether a
//! broken configuration is fatal.

use serde_json::Value;
use tracing::debug;

use super::{ConfigError, ConfigResult, RewriteConfig};
use crate::context::Context;

/// Divider marker splitting an `include` list into pre and post entries.
pub const INCLUDE_DIVIDER: &str = "%";

/// Apply a rewrite configuration to a context, in place.
pub fn apply_config(config: &RewriteConfig, context: &mut Context) -> ConfigResult<()> {
    if let Some(section) = &config.before {
        for entry in string_entries("before", section)? {
            let dir = context.resolve_path(&entry);
            context.add_pre_include(dir);
        }
    }

    if let Some(section) = &config.after {
        for entry in string_entries("after", section)? {
            let dir = context.resolve_path(&entry);
            context.add_post_include(dir);
        }
    }

    if let Some(section) = &config.include {
        apply_include(context, &string_entries("include", section)?)?;
    }

    if let Some(section) = &config.map {
        for (source, dest, kind) in map_entries(section)? {
            context.use_spec(&source, dest.as_deref(), kind.as_deref())?;
        }
    }

    debug!(
        root = %context.root().display(),
        rules = context.rule_count(),
        pre = context.pre_includes().len(),
        post = context.post_includes().len(),
        "applied rewrite config"
    );
    Ok(())
}

/// Split an `include` list on the divider marker.
///
/// Entries strictly before the divider become pre-includes, entries
/// strictly after become post-includes; with no divider everything is
/// a pre-include. More than one divider is a validation error.
fn apply_include(context: &mut Context, entries: &[String]) -> ConfigResult<()> {
    let dividers = entries.iter().filter(|e| *e == INCLUDE_DIVIDER).count();
    if dividers > 1 {
        return Err(ConfigError::Validation(format!(
            "'include' must contain at most one '{}' divider",
            INCLUDE_DIVIDER
        )));
    }

    let mut after_divider = false;
    for entry in entries {
        if entry == INCLUDE_DIVIDER {
            after_divider = true;
            continue;
        }
        let dir = context.resolve_path(entry);
        if after_divider {
            context.add_post_include(dir);
        } else {
            context.add_pre_include(dir);
        }
    }
    Ok(())
}

/// Validate a search-path section into a list of string entries.
fn string_entries(section: &str, value: &Value) -> ConfigResult<Vec<String>> {
    let array = value.as_array().ok_or_else(|| {
        ConfigError::Validation(format!("'{}' must be an array", section))
    })?;
    array
        .iter()
        .map(|entry| {
            entry.as_str().map(str::to_string).ok_or_else(|| {
                ConfigError::Validation(format!("'{}' entries must be strings", section))
            })
        })
        .collect()
}

/// Validate the `map` section into positional rule specs.
///
/// An entry is either a bare string (1-element shorthand) or an array
/// of 1 to 3 strings: source, destination, kind.
fn map_entries(value: &Value) -> ConfigResult<Vec<(String, Option<String>, Option<String>)>> {
    let array = value
        .as_array()
        .ok_or_else(|| ConfigError::Validation("'map' must be an array".to_string()))?;

    array
        .iter()
        .map(|entry| match entry {
            Value::String(source) => Ok((source.clone(), None, None)),
            Value::Array(parts) => {
                if parts.is_empty() || parts.len() > 3 {
                    return Err(ConfigError::Validation(format!(
                        "'map' entries must have 1 to 3 elements, got {}",
                        parts.len()
                    )));
                }
                let parts = parts
                    .iter()
                    .map(|part| {
                        part.as_str().map(str::to_string).ok_or_else(|| {
                            ConfigError::Validation(
                                "'map' entry elements must be strings".to_string(),
                            )
                        })
                    })
                    .collect::<ConfigResult<Vec<_>>>()?;
                Ok((parts[0].clone(), parts.get(1).cloned(), parts.get(2).cloned()))
            }
            _ => Err(ConfigError::Validation(
                "'map' entries must be strings or arrays".to_string(),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    const ROOT: &str = "/home/user/project";

    fn config(value: Value) -> RewriteConfig {
        serde_json::from_value(value).unwrap()
    }

    fn rooted(entry: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}", ROOT, entry))
    }

    #[test]
    fn test_before_requires_array() {
        let mut context = Context::new(ROOT);
        let result = apply_config(&config(json!({ "before": {} })), &mut context);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_before_entries_resolved_into_pre_includes() {
        let mut context = Context::new(ROOT);
        apply_config(
            &config(json!({ "before": ["src", "/abs/lib"] })),
            &mut context,
        )
        .unwrap();
        assert_eq!(
            context.pre_includes(),
            [rooted("src"), PathBuf::from("/abs/lib")]
        );
    }

    #[test]
    fn test_after_requires_array() {
        let mut context = Context::new(ROOT);
        let result = apply_config(&config(json!({ "after": {} })), &mut context);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_after_entries_resolved_into_post_includes() {
        let mut context = Context::new(ROOT);
        apply_config(&config(json!({ "after": ["src", "lib"] })), &mut context).unwrap();
        assert_eq!(context.post_includes(), [rooted("src"), rooted("lib")]);
    }

    #[test]
    fn test_include_requires_array() {
        let mut context = Context::new(ROOT);
        let result = apply_config(&config(json!({ "include": {} })), &mut context);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_include_split_on_divider() {
        let mut context = Context::new(ROOT);
        apply_config(
            &config(json!({ "include": ["src", "%", "lib"] })),
            &mut context,
        )
        .unwrap();
        assert_eq!(context.pre_includes(), [rooted("src")]);
        assert_eq!(context.post_includes(), [rooted("lib")]);
    }

    #[test]
    fn test_include_leading_divider() {
        let mut context = Context::new(ROOT);
        apply_config(&config(json!({ "include": ["%", "lib"] })), &mut context).unwrap();
        assert!(context.pre_includes().is_empty());
        assert_eq!(context.post_includes(), [rooted("lib")]);
    }

    #[test]
    fn test_include_trailing_divider() {
        let mut context = Context::new(ROOT);
        apply_config(&config(json!({ "include": ["src", "%"] })), &mut context).unwrap();
        assert_eq!(context.pre_includes(), [rooted("src")]);
        assert!(context.post_includes().is_empty());
    }

    #[test]
    fn test_include_without_divider_is_all_pre() {
        let mut context = Context::new(ROOT);
        apply_config(&config(json!({ "include": ["src", "lib"] })), &mut context).unwrap();
        assert_eq!(context.pre_includes(), [rooted("src"), rooted("lib")]);
        assert!(context.post_includes().is_empty());
    }

    #[test]
    fn test_include_rejects_second_divider() {
        let mut context = Context::new(ROOT);
        let result = apply_config(
            &config(json!({ "include": ["src", "%", "lib", "%", "gen"] })),
            &mut context,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_map_registers_every_entry() {
        let mut context = Context::new(ROOT);
        apply_config(&config(json!({ "map": ["src", "lib"] })), &mut context).unwrap();
        assert_eq!(context.rule_count(), 2);
    }

    #[test]
    fn test_map_later_entries_win() {
        let mut context = Context::new(ROOT);
        apply_config(
            &config(json!({ "map": [["mod", "first"], ["mod", "second"]] })),
            &mut context,
        )
        .unwrap();
        // Array order registers LIFO, so the later entry resolves.
        assert_eq!(
            context.resolve("mod/x"),
            Some(format!("{}/second/x", ROOT))
        );
    }

    #[test]
    fn test_map_entry_shapes() {
        let mut context = Context::new(ROOT);
        apply_config(
            &config(json!({ "map": [
                "solo",
                ["src", "dst"],
                ["pat/(.*)", "dst/$1", "match"]
            ] })),
            &mut context,
        )
        .unwrap();
        assert_eq!(context.rule_count(), 3);
    }

    #[test]
    fn test_map_rejects_long_entries() {
        let mut context = Context::new(ROOT);
        let result = apply_config(
            &config(json!({ "map": [["a", "b", "alias", "extra"]] })),
            &mut context,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_map_rejects_unknown_kind() {
        let mut context = Context::new(ROOT);
        let result = apply_config(&config(json!({ "map": [["a", "b", "foo"]] })), &mut context);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_application_is_not_atomic() {
        let mut context = Context::new(ROOT);
        let result = apply_config(
            &config(json!({ "before": ["src"], "map": "not an array" })),
            &mut context,
        );
        assert!(result.is_err());
        // The section applied before the failure stays applied.
        assert_eq!(context.pre_includes(), [rooted("src")]);
    }
}
