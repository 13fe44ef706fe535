// Application state module
// Holds the immutable configuration shared by every connection

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Serving root as configured; resolved against the filesystem per request
    pub root: PathBuf,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            root: PathBuf::from(&config.files.root),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Same configuration, different serving root
    pub fn with_root(config: &Config, root: impl AsRef<Path>) -> Self {
        let mut state = Self::new(config);
        state.root = root.as_ref().to_path_buf();
        state
    }
}
