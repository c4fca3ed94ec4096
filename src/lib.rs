//! depot - per-project file store over HTTP
//!
//! Authenticated users upload files into project directories, list them,
//! and download them. Access is governed by per-user allow-lists kept on
//! disk next to the stored content.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use auth::{
    AuthError, Authenticator, Identity, IdentityVerifier, PermissionError, PermissionStore,
    PlainTokenVerifier,
};
pub use config::Config;
pub use error::{DepotError, Result};
pub use storage::{FileEntry, PathError, PathResolver, ProjectStore, Segment, StorageError};
pub use web::WebServer;
