//! Token authentication middleware.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{AuthError, Authenticator, Identity};
use crate::web::error::ApiError;

/// Extractor for authenticated users.
///
/// Resolves the caller's identity from `Authorization: Token <id>` using the
/// [`Authenticator`] placed in the request extensions by [`inject_authenticator`].
/// Rejects with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let authenticator = parts
                .extensions
                .get::<Arc<Authenticator>>()
                .ok_or_else(|| ApiError::internal("server error"))?;

            let identity = match parts.headers.get(AUTHORIZATION) {
                None => authenticator.authenticate(None),
                Some(value) => match std::str::from_utf8(value.as_bytes()) {
                    Ok(header) => authenticator.authenticate(Some(header)),
                    Err(_) => Err(AuthError::WrongScheme),
                },
            };

            identity.map(AuthUser).map_err(|e| {
                tracing::error!(error = %e, "Failed authentication");
                ApiError::from(e)
            })
        })
    }
}

/// Middleware function to inject the authenticator into request extensions.
pub async fn inject_authenticator(
    authenticator: Arc<Authenticator>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(authenticator);
    next.run(request).await
}
