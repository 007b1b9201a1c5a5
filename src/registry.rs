//! Context Registry
//!
//! Process-wide cache mapping absolute tree roots to their `Context`.
//! The registry is an explicit object (typically behind
//! `SharedRegistry`), not ambient global state: create it once at
//! startup, tear it down only for test isolation.
//!
//! Ownership lookup uses the longest-prefix rule: for a given file
//! path the owning context is the cached root that is the longest
//! directory prefix of that path. A path under no cached root has no
//! owner; lookup never fabricates one.

use std::collections::HashMap;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::config::{apply_config, find_config_file, load_config, ConfigResult};
use crate::context::Context;

/// A context shared between the registry and its users.
pub type SharedContext = Arc<RwLock<Context>>;

/// Thread-safe wrapper for the registry.
///
/// Context creation is a check-then-act sequence (lookup miss, create,
/// insert), so concurrent hosts must serialize through this lock.
pub type SharedRegistry = Arc<RwLock<ContextRegistry>>;

/// Create a new shared registry.
pub fn new_shared_registry() -> SharedRegistry {
    Arc::new(RwLock::new(ContextRegistry::new()))
}

/// Cache of per-tree-root contexts plus the process-default context.
pub struct ContextRegistry {
    /// The process-default context (empty root). Not part of the root
    /// map: it owns no files and survives `clear`.
    default_context: SharedContext,

    /// Tree root directory → context.
    contexts: HashMap<PathBuf, SharedContext>,
}

impl ContextRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            default_context: Arc::new(RwLock::new(Context::process_default())),
            contexts: HashMap::new(),
        }
    }

    /// The process-default context, consulted for every request before
    /// the owning context.
    pub fn default_context(&self) -> SharedContext {
        Arc::clone(&self.default_context)
    }

    /// Number of cached tree contexts (the default context not counted).
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Look up the context cached for exactly `root`.
    pub fn get(&self, root: &Path) -> Option<SharedContext> {
        self.contexts.get(root).map(Arc::clone)
    }

    /// Register a pre-built context under its root.
    ///
    /// Programmatic counterpart to config-driven creation; an existing
    /// entry for the same root is replaced.
    pub fn insert(&mut self, context: Context) -> SharedContext {
        let root = context.root().to_path_buf();
        let shared = Arc::new(RwLock::new(context));
        self.contexts.insert(root, Arc::clone(&shared));
        shared
    }

    /// Find the owning context of `file`: the cached root that is the
    /// longest directory prefix of the path. Never creates.
    pub fn owner_of(&self, file: &Path) -> Option<SharedContext> {
        self.contexts
            .iter()
            .filter(|(root, _)| file.starts_with(root))
            .max_by_key(|(root, _)| root.as_os_str().len())
            .map(|(_, context)| Arc::clone(context))
    }

    /// Get the context governing `file`, creating it on first touch.
    ///
    /// The governing configuration file is located by walking up from
    /// `file`; the context root is that file's directory. When no
    /// configuration exists anywhere above `file`, the context is
    /// rooted at the filesystem root (still distinct from the
    /// process-default context).
    ///
    /// A new context is registered *before* its configuration is
    /// applied: when the configuration turns out broken, the error
    /// propagates but the partially-constructed entry stays cached.
    pub fn get_or_create(&mut self, file: &Path) -> ConfigResult<SharedContext> {
        match find_config_file(file) {
            Some(config_path) => {
                let root = config_path
                    .parent()
                    .unwrap_or_else(|| Path::new(MAIN_SEPARATOR_STR))
                    .to_path_buf();
                if let Some(context) = self.contexts.get(&root) {
                    return Ok(Arc::clone(context));
                }

                debug!(root = %root.display(), config = %config_path.display(), "creating context");
                let shared = self.insert(Context::new(root));

                let loaded = load_config(&config_path)?;
                {
                    let mut context = shared.write().unwrap();
                    context.set_name(loaded.name);
                    apply_config(&loaded.config, &mut context)?;
                }
                Ok(shared)
            }
            None => {
                let root = PathBuf::from(MAIN_SEPARATOR_STR);
                if let Some(context) = self.contexts.get(&root) {
                    return Ok(Arc::clone(context));
                }
                debug!(file = %file.display(), "no config found, using bare root context");
                Ok(self.insert(Context::new(root)))
            }
        }
    }

    /// Drop all cached tree contexts. Test isolation only; the
    /// process-default context is retained.
    pub fn clear(&mut self) {
        self.contexts.clear();
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("context_count", &self.contexts.len())
            .finish()
    }
}
