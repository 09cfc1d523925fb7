// Application state module
// Read-only runtime state shared by every connection

use std::io;
use std::path::{Path, PathBuf};

use super::types::Config;
use crate::http::mime::ContentTypeMap;

/// Application state
///
/// Built once before the listener accepts connections and never mutated
/// afterwards, so it is shared behind an `Arc` without locking.
pub struct AppState {
    pub config: Config,
    /// Canonicalized document root
    pub root: PathBuf,
    pub content_types: ContentTypeMap,
}

impl AppState {
    /// Create `AppState`, resolving `server.root` against the working directory
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = Path::new(&config.server.root).canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a directory", root.display()),
            ));
        }

        Ok(Self {
            config: config.clone(),
            root,
            content_types: ContentTypeMap::with_dev_overrides(),
        })
    }

    /// Same as [`AppState::new`] but serving an explicit directory
    #[cfg(test)]
    pub fn for_root(root: &Path) -> io::Result<Self> {
        let mut config = Config::load_from("definitely-missing-devserve-config")
            .map_err(|e| io::Error::other(e.to_string()))?;
        config.server.root = root.display().to_string();
        config.logging.access_log = false;
        Self::new(&config)
    }
}
