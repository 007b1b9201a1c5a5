//! Rewrite Rules
//!
//! A `Rule` is a single request→destination transform. Three variants:
//! - `Alias` - Literal prefix replacement with token-boundary matching
//! - `Match` - Full-string regex match with `$n` back-reference templates
//! - `Custom` - An arbitrary request→result function supplied by the host
//!
//! Rules never fail: a request that does not match yields `None`, the
//! first-class "no match" sentinel. Errors only occur while *building*
//! a rule (e.g. an invalid pattern).

use regex::Regex;

use crate::config::ConfigError;

/// A custom rule body: any function from a request to an optional result.
pub type CustomFn = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// The kind tag of a rule, exposed for introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    /// Literal-prefix replacement (`alias` in configuration files).
    Alias,
    /// Regex capture/template rewrite (`match` in configuration files).
    Match,
    /// Host-supplied function, no declarative form.
    Custom,
}

impl RuleKind {
    /// Parse the configuration-file spelling of a rule kind.
    ///
    /// Only the declarative kinds (`"alias"`, `"match"`) have a
    /// spelling; anything else is a validation error.
    pub fn parse(kind: &str) -> Result<Self, ConfigError> {
        match kind {
            "alias" => Ok(RuleKind::Alias),
            "match" => Ok(RuleKind::Match),
            other => Err(ConfigError::Validation(format!(
                "unknown rule kind '{}': expected 'alias' or 'match'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Alias => write!(f, "alias"),
            RuleKind::Match => write!(f, "match"),
            RuleKind::Custom => write!(f, "custom"),
        }
    }
}

/// A single request-rewrite rule.
pub enum Rule {
    /// Replace the prefix `source` with `dest`.
    ///
    /// Matches the exact request or a prefix followed by `/`; a bare
    /// substring continuation (`"srcother"` against source `"src"`)
    /// never matches.
    Alias { source: String, dest: String },

    /// Rewrite a full-string regex match through a back-reference
    /// template (`$1`, `$2`, ...).
    Match { pattern: Regex, template: String },

    /// Host-supplied transform, used verbatim.
    Custom(CustomFn),
}

impl Rule {
    /// Build a literal-prefix rule.
    ///
    /// Trailing separators on either side are normalized away, so
    /// `alias("src/", "dst/")` and `alias("src", "dst")` behave the
    /// same.
    pub fn alias(source: &str, dest: &str) -> Self {
        Rule::Alias {
            source: source.trim_end_matches('/').to_string(),
            dest: dest.trim_end_matches('/').to_string(),
        }
    }

    /// Build a pattern rule from a regex source and a destination
    /// template with numbered back-references.
    ///
    /// The pattern is anchored to the full request; partial matches do
    /// not rewrite.
    pub fn matcher(pattern: &str, template: &str) -> Result<Self, ConfigError> {
        let anchored = format!("^(?:{})$", pattern);
        let pattern = Regex::new(&anchored).map_err(|e| {
            ConfigError::Validation(format!("invalid match pattern '{}': {}", pattern, e))
        })?;
        Ok(Rule::Match {
            pattern,
            template: template.to_string(),
        })
    }

    /// Build a custom rule from a function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Rule::Custom(Box::new(f))
    }

    /// Get the kind tag of this rule.
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Alias { .. } => RuleKind::Alias,
            Rule::Match { .. } => RuleKind::Match,
            Rule::Custom(_) => RuleKind::Custom,
        }
    }

    /// Apply this rule to a request.
    ///
    /// Returns the rewritten destination, or `None` when the rule does
    /// not match. Destinations are returned verbatim; re-basing
    /// relative results onto a context root happens in
    /// `Context::resolve`.
    pub fn apply(&self, request: &str) -> Option<String> {
        match self {
            Rule::Alias { source, dest } => {
                if request == source {
                    return Some(dest.clone());
                }
                let rest = request.strip_prefix(source.as_str())?;
                let tail = rest.strip_prefix('/')?;
                Some(format!("{}/{}", dest, tail))
            }
            Rule::Match { pattern, template } => {
                let caps = pattern.captures(request)?;
                let mut out = String::new();
                caps.expand(template, &mut out);
                Some(out)
            }
            Rule::Custom(f) => f(request),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Alias { source, dest } => f
                .debug_struct("Alias")
                .field("source", source)
                .field("dest", dest)
                .finish(),
            Rule::Match { pattern, template } => f
                .debug_struct("Match")
                .field("pattern", &pattern.as_str())
                .field("template", template)
                .finish(),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
