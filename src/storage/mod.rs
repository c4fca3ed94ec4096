//! Storage module for depot.
//!
//! This module provides:
//! - Path resolution and validation of client-supplied names
//! - Project directory listing, upload, and download

pub mod path;
mod project;

pub use path::{PathError, PathResolver, Segment, PERMISSIONS_FILE, UPLOAD_TEMP_PREFIX};
pub use project::{FileEntry, ProjectStore, StorageError};
