//! Web API module for depot.
//!
//! This module exposes project file upload, listing, and download over HTTP.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
