//! require-rewrite - Layered Module-Request Rewriting
//!
//! This library rewrites module-path requests ("give me module X")
//! into alternate physical locations, driven by per-directory
//! configuration files, without modifying the requesting code.
//!
//! # Architecture
//!
//! For any directory in a source tree the engine determines the
//! nearest enclosing package configuration, builds an ordered chain of
//! rewrite rules from it, and executes the chain against incoming
//! requests:
//!
//! 1. **Rules** (`rules` module) - literal-prefix aliases, regex
//!    capture/template rewrites, or host-supplied functions. A miss is
//!    `None`, never an error.
//! 2. **Configuration** (`config` module) - discovery of the governing
//!    file (`require-rewrite.json` > `.require-rewrite.json` >
//!    `package.json` with a `requireRewrite` key, walking upward and
//!    stopping at `node_modules` boundaries), JSON loading, and
//!    application of the `before`/`after`/`include`/`map` sections.
//! 3. **Context** (`context` module) - one tree root's rule chain
//!    (LIFO precedence) and extra search-path lists.
//! 4. **Registry** (`registry` module) - process-wide cache of
//!    contexts keyed by root, longest-prefix ownership lookup, lazy
//!    creation on first touch.
//! 5. **Orchestrator** (`host` module) - the hooks a host module
//!    loader drives, plus the programmatic registration API.
//!
//! # Example
//!
//! ```rust
//! use require_rewrite::{ResolutionHooks, Rewriter};
//! use std::path::Path;
//!
//! let rewriter = Rewriter::new();
//!
//! // Process-wide alias: every bare "legacy-lib" request resolves to
//! // "modern-lib" instead.
//! rewriter.use_global("legacy-lib", Some("modern-lib"), None).unwrap();
//!
//! let rewritten = rewriter
//!     .rewrite_request("legacy-lib/util", Path::new("/app/src/index.js"))
//!     .unwrap();
//! assert_eq!(rewritten.as_deref(), Some("modern-lib/util"));
//!
//! // Relative and absolute requests pass through untouched.
//! let untouched = rewriter
//!     .rewrite_request("./sibling", Path::new("/app/src/index.js"))
//!     .unwrap();
//! assert_eq!(untouched, None);
//! ```
//!
//! The engine never copies or moves files; it only computes rewritten
//! identifiers and extra search directories. The host loader keeps its
//! own resolution algorithm and default behavior.

pub mod config;
pub mod context;
pub mod host;
pub mod registry;
pub mod rules;

pub use config::{
    apply_config, find_config_file, load_config, ConfigError, ConfigResult, LoadedConfig,
    RewriteConfig,
};
pub use context::Context;
pub use host::{ResolutionHooks, Rewriter};
pub use registry::{new_shared_registry, ContextRegistry, SharedContext, SharedRegistry};
pub use rules::{Rule, RuleKind};
