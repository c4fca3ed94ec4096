//! Router configuration for the file API.

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::auth::Authenticator;
use crate::config::HttpConfig;

use super::handlers::{create_file, get_file, list_files, AppState};
use super::middleware::{create_cors_layer, inject_authenticator, log_requests, security_headers};

/// Create the file API router.
///
/// Routes:
/// - `POST /:project` upload a file
/// - `GET /:project` list a project's files
/// - `GET /:project/:fname` download a file
pub fn create_router(
    app_state: Arc<AppState>,
    authenticator: Arc<Authenticator>,
    http: &HttpConfig,
) -> Router {
    Router::new()
        .route("/:project", get(list_files).post(create_file))
        .route("/:project/:fname", get(get_file))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(middleware::from_fn(security_headers))
                .layer(create_cors_layer(&http.cors_origins))
                .layer(body_limit(http))
                .layer(middleware::from_fn(move |req, next| {
                    let authenticator = authenticator.clone();
                    inject_authenticator(authenticator, req, next)
                })),
        )
        .with_state(app_state)
}

/// Upload body limit; `max_upload_size_mb = 0` lifts it.
fn body_limit(http: &HttpConfig) -> DefaultBodyLimit {
    match http.max_upload_size_bytes() {
        0 => DefaultBodyLimit::disable(),
        limit => DefaultBodyLimit::max(limit),
    }
}
