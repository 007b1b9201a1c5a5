//! Configuration File Discovery
//!
//! Walks the directory chain upward from a starting path to find the
//! nearest governing configuration file. At each level the candidates
//! are checked in fixed priority order:
//!
//! 1. `require-rewrite.json` (dedicated config file)
//! 2. `.require-rewrite.json` (dotfile variant)
//! 3. `package.json`, but only when it contains the `requireRewrite` key
//!
//! The walk treats a `node_modules` directory as a hard boundary:
//! paths inside an installed dependency only ever see that
//! dependency's own configuration, never the consumer's.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Dedicated configuration filename. Counts as a candidate by mere
/// presence; content is validated at load time.
pub const CONFIG_FILE: &str = "require-rewrite.json";

/// Dotfile variant of the dedicated configuration filename.
pub const DOT_CONFIG_FILE: &str = ".require-rewrite.json";

/// Canonical package manifest filename.
pub const MANIFEST_FILE: &str = "package.json";

/// Top-level manifest key holding the rewrite configuration.
pub const MANIFEST_KEY: &str = "requireRewrite";

/// Dependency-installation root marker; the upward walk never crosses it.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Find the nearest governing configuration file for `start`.
///
/// `start` may be a file or a directory: candidate names are joined
/// onto each ancestor in turn, so a file path naturally yields its
/// directory's candidates one level up.
///
/// Returns `None` when the walk reaches the filesystem root, or a
/// `node_modules` boundary, without a match. "Not found" is a normal
/// outcome, not an error.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        // Boundary: never consider node_modules itself or anything above it.
        if dir.file_name().is_some_and(|name| name == DEPENDENCY_DIR) {
            return None;
        }

        for candidate in [CONFIG_FILE, DOT_CONFIG_FILE] {
            let path = dir.join(candidate);
            if path.is_file() {
                debug!(path = %path.display(), "found rewrite config");
                return Some(path);
            }
        }

        let manifest = dir.join(MANIFEST_FILE);
        if manifest.is_file() && manifest_has_rewrite_key(&manifest) {
            debug!(path = %manifest.display(), "found manifest with rewrite key");
            return Some(manifest);
        }

        dir = dir.parent()?;
    }
}

/// Check whether a manifest carries the rewrite key.
///
/// A manifest that cannot be read or parsed does not count as a
/// candidate here; dedicated filenames fail loudly at load time
/// instead.
fn manifest_has_rewrite_key(manifest: &Path) -> bool {
    let content = match std::fs::read_to_string(manifest) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %manifest.display(), %err, "skipping unreadable manifest");
            return false;
        }
    };
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => value.get(MANIFEST_KEY).is_some(),
        Err(err) => {
            debug!(path = %manifest.display(), %err, "skipping unparseable manifest");
            false
        }
    }
}
