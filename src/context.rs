//! Resolution Context
//!
//! A `Context` is the resolution unit bound to one directory-tree
//! root. It owns:
//! - A rule chain (front = most recently registered = highest
//!   precedence)
//! - Extra search-path lists spliced before/after the host loader's
//!   own lookup list
//! - An optional package name, for identification only
//!
//! The process-default context has an empty root; its resolved
//! destinations are returned verbatim instead of being re-based.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::{ConfigError, ConfigResult};
use crate::rules::{Rule, RuleKind};

/// The resolution unit for one tree root.
#[derive(Debug)]
pub struct Context {
    /// Absolute root directory; empty for the process-default context.
    root: PathBuf,

    /// Package name from the governing manifest, if any.
    name: Option<String>,

    /// Rule chain, most recently registered first.
    chain: VecDeque<Rule>,

    /// Directories spliced before the host's lookup list.
    pre_includes: Vec<PathBuf>,

    /// Directories spliced after the host's lookup list.
    post_includes: Vec<PathBuf>,
}

impl Context {
    /// Create an empty context rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: None,
            chain: VecDeque::new(),
            pre_includes: Vec::new(),
            post_includes: Vec::new(),
        }
    }

    /// Create the process-default context (empty root).
    ///
    /// Distinct from a context rooted at the filesystem root: rules in
    /// this context never re-base their results, so bare-name aliases
    /// stay bare.
    pub fn process_default() -> Self {
        Self::new(PathBuf::new())
    }

    /// The context's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The declared package name, if the governing config was a manifest.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the package name (called during configuration application).
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Iterate the rule chain in precedence order (newest first).
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.chain.iter()
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.chain.len()
    }

    /// Directories spliced before the host's lookup list.
    pub fn pre_includes(&self) -> &[PathBuf] {
        &self.pre_includes
    }

    /// Directories spliced after the host's lookup list.
    pub fn post_includes(&self) -> &[PathBuf] {
        &self.post_includes
    }

    /// Append a directory to the pre-include list.
    pub fn add_pre_include(&mut self, dir: PathBuf) {
        self.pre_includes.push(dir);
    }

    /// Append a directory to the post-include list.
    pub fn add_post_include(&mut self, dir: PathBuf) {
        self.post_includes.push(dir);
    }

    /// Resolve a possibly-relative entry against the context root.
    pub fn resolve_path(&self, entry: &str) -> PathBuf {
        let path = Path::new(entry);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Register a rule at the front of the chain.
    ///
    /// Later registrations take precedence over earlier ones (LIFO).
    pub fn use_rule(&mut self, rule: Rule) {
        self.chain.push_front(rule);
    }

    /// Register a rule from its positional spec form.
    ///
    /// Mirrors the 1/2/3-argument registration shapes:
    /// - `(source)` - alias whose destination is the source itself; the
    ///   re-basing in [`resolve`](Self::resolve) pins such requests
    ///   under the context root.
    /// - `(source, dest)` - alias.
    /// - `(source, dest, kind)` - explicit kind, `"alias"` or
    ///   `"match"`; anything else is a validation error.
    pub fn use_spec(
        &mut self,
        source: &str,
        dest: Option<&str>,
        kind: Option<&str>,
    ) -> ConfigResult<()> {
        let kind = match kind {
            Some(kind) => RuleKind::parse(kind)?,
            None => RuleKind::Alias,
        };
        let rule = match kind {
            RuleKind::Alias => Rule::alias(source, dest.unwrap_or(source)),
            RuleKind::Match => {
                let template = dest.ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "match rule '{}' requires a destination template",
                        source
                    ))
                })?;
                Rule::matcher(source, template)?
            }
            // RuleKind::parse never yields Custom.
            RuleKind::Custom => unreachable!("custom rules have no spec form"),
        };
        self.use_rule(rule);
        Ok(())
    }

    /// Resolve a request through the rule chain.
    ///
    /// Rules are tried front-to-back; the first non-miss wins and is
    /// never retried or combined. A relative winning destination is
    /// re-based onto the context root (unless the root is empty).
    /// Returns `None` when no rule matches.
    pub fn resolve(&self, request: &str) -> Option<String> {
        for rule in &self.chain {
            if let Some(dest) = rule.apply(request) {
                let resolved = self.rebase(dest);
                trace!(request, resolved = %resolved, kind = %rule.kind(), "rule hit");
                return Some(resolved);
            }
        }
        None
    }

    /// Clear the rule chain and both include lists.
    ///
    /// Used for test isolation and reinitialization; the root and name
    /// are retained.
    pub fn reset(&mut self) {
        self.chain.clear();
        self.pre_includes.clear();
        self.post_includes.clear();
    }

    fn rebase(&self, dest: String) -> String {
        if self.root.as_os_str().is_empty() || Path::new(&dest).is_absolute() {
            dest
        } else {
            self.root.join(dest).to_string_lossy().into_owned()
        }
    }
}
