//! Per-user project permissions.
//!
//! Each user has an allow-list at `users_dir/<identity>/projects`, one
//! project name per line. The file is managed outside the service and is
//! re-read on every check.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;

use super::token::Identity;
use crate::storage::{PathError, PathResolver, Segment};

/// Permission-related errors.
#[derive(Error, Debug)]
pub enum PermissionError {
    /// The identity cannot name a permission file.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] PathError),

    /// The permission file could not be read.
    #[error("failed to read user permissions at {}: {source}", .path.display())]
    Unreadable {
        /// Permission file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The project is not on the user's allow-list.
    #[error("{user} isn't allowed in {project}")]
    NotPermitted {
        /// Acting user.
        user: String,
        /// Requested project.
        project: String,
    },
}

/// Returns true if `list` has a line exactly equal to `project`.
///
/// Lines are split on `\n` only; no trimming, wildcards, or hierarchy.
pub fn list_contains(list: &str, project: &str) -> bool {
    list.split('\n').any(|line| line == project)
}

/// Answers "may this identity access this project?" from allow-list files.
#[derive(Debug, Clone)]
pub struct PermissionStore {
    resolver: PathResolver,
}

impl PermissionStore {
    /// Create a permission store over the given resolver.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Path of the allow-list for `identity`.
    pub fn permissions_path(&self, identity: &Identity) -> Result<PathBuf, PermissionError> {
        Ok(self.resolver.permissions_path(identity.as_str())?)
    }

    /// Check that `identity` may access `project`.
    pub async fn check(&self, identity: &Identity, project: &Segment) -> Result<(), PermissionError> {
        let path = self.permissions_path(identity)?;

        let list = fs::read_to_string(&path)
            .await
            .map_err(|source| PermissionError::Unreadable { path, source })?;

        if list_contains(&list, project.as_str()) {
            Ok(())
        } else {
            Err(PermissionError::NotPermitted {
                user: identity.to_string(),
                project: project.to_string(),
            })
        }
    }
}
