//! Middleware for the file API.

pub mod auth;
pub mod cors;
pub mod request_log;
pub mod security;

pub use auth::{inject_authenticator, AuthUser};
pub use cors::create_cors_layer;
pub use request_log::log_requests;
pub use security::security_headers;
