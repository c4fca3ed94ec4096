//! API handlers for the file store.

pub mod file;

pub use file::*;

use crate::auth::PermissionStore;
use crate::config::Config;
use crate::storage::{PathResolver, ProjectStore};

/// Shared application state.
///
/// Immutable after startup; every request reads the filesystem afresh.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Project allow-list lookups.
    pub permissions: PermissionStore,
    /// Project file storage.
    pub store: ProjectStore,
}

impl AppState {
    /// Create application state over a path resolver.
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            permissions: PermissionStore::new(resolver.clone()),
            store: ProjectStore::new(resolver),
        }
    }

    /// Create application state from the configured storage roots.
    pub fn from_config(config: &Config) -> Self {
        Self::new(PathResolver::from_config(config))
    }
}
