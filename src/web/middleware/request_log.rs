//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Header carrying the client address when running behind a proxy.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Log every inbound request with its endpoint, method, and client IP.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let ip = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    tracing::info!(
        endpoint = %request.uri(),
        method = %request.method(),
        ip,
        "Got request"
    );

    next.run(request).await
}
