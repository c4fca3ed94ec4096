//! Security headers middleware.

use axum::{
    body::Body,
    http::{
        header::{HeaderName, HeaderValue, CACHE_CONTROL},
        Request,
    },
    middleware::Next,
    response::Response,
};

/// Headers set on every response, overriding handler values.
const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
];

/// Add security headers to every response.
///
/// Stored files are served as opaque bytes, so `nosniff` keeps browsers from
/// rendering uploaded content as HTML. Responses are not cacheable unless a
/// handler says otherwise.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}
