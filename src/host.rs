//! Resolution Orchestrator
//!
//! `Rewriter` is the entry point a host module loader integrates with.
//! The host keeps its own resolution algorithm; the orchestrator only
//! intercepts at three explicit extension points (`ResolutionHooks`):
//!
//! - **Request rewriting** - bare requests run through the
//!   process-default context, then the owning context of the
//!   originating file; the first hit replaces the request the host
//!   resolves. Misses fall through unchanged.
//! - **Lookup paths** - the owning context's pre/post include lists
//!   are spliced around the host's own search-path list.
//! - **Load** - every file load lazily ensures a context exists for
//!   the file's tree root.
//!
//! The programmatic registration API (`use_global*` / `use_from*`)
//! mirrors the 1/2/3-argument configuration shapes.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::ConfigResult;
use crate::registry::{new_shared_registry, SharedContext, SharedRegistry};
use crate::rules::Rule;

/// The extension points a host loader drives.
///
/// Hosts register an implementation of this trait against their own
/// loader machinery; the loader internals stay untouched.
pub trait ResolutionHooks {
    /// Filename-resolution hook.
    ///
    /// Returns the rewritten request, or `None` to let the host
    /// resolve the original unchanged. Context creation errors (broken
    /// configuration discovered on first touch) propagate to the host.
    fn rewrite_request(&self, request: &str, originating_file: &Path)
        -> ConfigResult<Option<String>>;

    /// Lookup-paths hook for bare requests.
    ///
    /// Splices the owning context's extra search directories around
    /// the host's own list; a file with no owning context gets the
    /// host's list back unchanged.
    fn lookup_paths(&self, originating_file: &Path, host_paths: &[PathBuf]) -> Vec<PathBuf>;

    /// Load hook: ensure a context exists for the loaded file's root
    /// before the host performs its own load.
    fn on_load(&self, file: &Path) -> ConfigResult<()>;
}

/// Orchestrator over a shared context registry.
#[derive(Debug)]
pub struct Rewriter {
    registry: SharedRegistry,
}

impl Rewriter {
    /// Create an orchestrator with a fresh registry.
    pub fn new() -> Self {
        Self {
            registry: new_shared_registry(),
        }
    }

    /// Create an orchestrator over an existing registry.
    pub fn with_registry(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> SharedRegistry {
        SharedRegistry::clone(&self.registry)
    }

    /// Whether a request is bare: neither relative (leading `.`) nor
    /// absolute (leading separator). Only bare requests are rewritten.
    pub fn is_bare(request: &str) -> bool {
        !request.starts_with('.') && !request.starts_with('/')
    }

    /// Register a declarative rule on the process-default context.
    ///
    /// Same positional shapes as the `map` configuration section.
    pub fn use_global(
        &self,
        source: &str,
        dest: Option<&str>,
        kind: Option<&str>,
    ) -> ConfigResult<()> {
        let default = self.registry.read().unwrap().default_context();
        let mut context = default.write().unwrap();
        context.use_spec(source, dest, kind)
    }

    /// Register a custom rule on the process-default context.
    pub fn use_global_rule(&self, rule: Rule) {
        let default = self.registry.read().unwrap().default_context();
        default.write().unwrap().use_rule(rule);
    }

    /// Register a declarative rule on the context owning `file`,
    /// creating the context on demand.
    pub fn use_from(
        &self,
        file: &Path,
        source: &str,
        dest: Option<&str>,
        kind: Option<&str>,
    ) -> ConfigResult<()> {
        let context = self.owning_context(file)?;
        let mut context = context.write().unwrap();
        context.use_spec(source, dest, kind)
    }

    /// Register a custom rule on the context owning `file`, creating
    /// the context on demand.
    pub fn use_from_rule(&self, file: &Path, rule: Rule) -> ConfigResult<()> {
        let context = self.owning_context(file)?;
        context.write().unwrap().use_rule(rule);
        Ok(())
    }

    /// The cached owner of `file`, falling back to creation on demand.
    fn owning_context(&self, file: &Path) -> ConfigResult<SharedContext> {
        let cached = self.registry.read().unwrap().owner_of(file);
        match cached {
            Some(context) => Ok(context),
            None => self.registry.write().unwrap().get_or_create(file),
        }
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionHooks for Rewriter {
    fn rewrite_request(
        &self,
        request: &str,
        originating_file: &Path,
    ) -> ConfigResult<Option<String>> {
        if !Self::is_bare(request) {
            return Ok(None);
        }

        // Process-default context first, then the tree-specific one.
        let default = self.registry.read().unwrap().default_context();
        if let Some(rewritten) = default.read().unwrap().resolve(request) {
            trace!(request, rewritten = %rewritten, "rewritten by default context");
            return Ok(Some(rewritten));
        }

        let owner = self.owning_context(originating_file)?;
        let rewritten = owner.read().unwrap().resolve(request);
        if let Some(rewritten) = &rewritten {
            trace!(request, rewritten = %rewritten, "rewritten by owning context");
        }
        Ok(rewritten)
    }

    fn lookup_paths(&self, originating_file: &Path, host_paths: &[PathBuf]) -> Vec<PathBuf> {
        let owner = self.registry.read().unwrap().owner_of(originating_file);
        match owner {
            Some(owner) => {
                let context = owner.read().unwrap();
                if context.pre_includes().is_empty() && context.post_includes().is_empty() {
                    return host_paths.to_vec();
                }
                trace!(
                    file = %originating_file.display(),
                    pre = context.pre_includes().len(),
                    post = context.post_includes().len(),
                    "splicing lookup paths"
                );
                context
                    .pre_includes()
                    .iter()
                    .cloned()
                    .chain(host_paths.iter().cloned())
                    .chain(context.post_includes().iter().cloned())
                    .collect()
            }
            None => host_paths.to_vec(),
        }
    }

    fn on_load(&self, file: &Path) -> ConfigResult<()> {
        self.registry.write().unwrap().get_or_create(file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::registry::ContextRegistry;
    use std::sync::{Arc, RwLock};

    fn rewriter_with(context: Context) -> Rewriter {
        let mut registry = ContextRegistry::new();
        registry.insert(context);
        Rewriter::with_registry(Arc::new(RwLock::new(registry)))
    }

    #[test]
    fn test_is_bare() {
        assert!(Rewriter::is_bare("lodash"));
        assert!(Rewriter::is_bare("src/util"));
        assert!(!Rewriter::is_bare("./sibling"));
        assert!(!Rewriter::is_bare("../parent"));
        assert!(!Rewriter::is_bare("/abs/path"));
    }

    #[test]
    fn test_relative_and_absolute_requests_pass_through() {
        let rewriter = Rewriter::new();
        rewriter.use_global("src", Some("dst"), None).unwrap();
        let file = Path::new("/app/index.js");
        assert_eq!(rewriter.rewrite_request("./src/a", file).unwrap(), None);
        assert_eq!(rewriter.rewrite_request("/src/a", file).unwrap(), None);
    }

    #[test]
    fn test_default_context_rewrites_bare_requests() {
        let rewriter = Rewriter::new();
        rewriter.use_global("lodash", Some("lodash-es"), None).unwrap();
        let result = rewriter
            .rewrite_request("lodash/map", Path::new("/app/index.js"))
            .unwrap();
        assert_eq!(result, Some("lodash-es/map".to_string()));
    }

    #[test]
    fn test_owning_context_is_fallback_after_default() {
        let mut context = Context::new("/app");
        context.use_spec("mod", Some("lib/mod"), None).unwrap();
        let rewriter = rewriter_with(context);

        let result = rewriter
            .rewrite_request("mod/x", Path::new("/app/src/index.js"))
            .unwrap();
        assert_eq!(result, Some("/app/lib/mod/x".to_string()));
    }

    #[test]
    fn test_default_context_wins_over_owning_context() {
        let mut context = Context::new("/app");
        context.use_spec("mod", Some("from-tree"), None).unwrap();
        let rewriter = rewriter_with(context);
        rewriter.use_global("mod", Some("from-default"), None).unwrap();

        let result = rewriter
            .rewrite_request("mod", Path::new("/app/src/index.js"))
            .unwrap();
        assert_eq!(result, Some("from-default".to_string()));
    }

    #[test]
    fn test_lookup_paths_splice() {
        let mut context = Context::new("/app");
        context.add_pre_include(PathBuf::from("/app/src"));
        context.add_post_include(PathBuf::from("/app/lib"));
        let rewriter = rewriter_with(context);

        let host_paths = [PathBuf::from("/app/node_modules")];
        let spliced = rewriter.lookup_paths(Path::new("/app/src/index.js"), &host_paths);
        assert_eq!(
            spliced,
            [
                PathBuf::from("/app/src"),
                PathBuf::from("/app/node_modules"),
                PathBuf::from("/app/lib"),
            ]
        );
    }

    #[test]
    fn test_lookup_paths_pass_through_without_owner() {
        let rewriter = Rewriter::new();
        let host_paths = [PathBuf::from("/app/node_modules")];
        let spliced = rewriter.lookup_paths(Path::new("/elsewhere/file.js"), &host_paths);
        assert_eq!(spliced, host_paths);
    }

    #[test]
    fn test_use_from_targets_owning_context() {
        let rewriter = rewriter_with(Context::new("/app"));
        rewriter
            .use_from(Path::new("/app/src/index.js"), "mod", Some("lib"), None)
            .unwrap();

        let result = rewriter
            .rewrite_request("mod", Path::new("/app/other.js"))
            .unwrap();
        assert_eq!(result, Some("/app/lib".to_string()));
    }

    #[test]
    fn test_custom_rule_registration() {
        let rewriter = Rewriter::new();
        rewriter.use_global_rule(Rule::custom(|req| {
            req.strip_prefix("app:").map(str::to_string)
        }));
        let result = rewriter
            .rewrite_request("app:feature", Path::new("/app/index.js"))
            .unwrap();
        assert_eq!(result, Some("feature".to_string()));
    }
}
