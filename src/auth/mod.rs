//! Authentication and authorization module for depot.
//!
//! This module provides token-based identity extraction and
//! per-user project allow-list checks.

pub mod permission;
mod token;

pub use permission::{list_contains, PermissionError, PermissionStore};
pub use token::{
    extract_token, AuthError, Authenticator, Identity, IdentityVerifier, PlainTokenVerifier,
    TOKEN_SCHEME,
};
