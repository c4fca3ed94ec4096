//! Token authentication.
//!
//! Requests carry `Authorization: Token <token>`. The scheme is parsed here
//! and the token handed to an [`IdentityVerifier`], which decides who the
//! caller is.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Authorization scheme prefix, including the separating space.
pub const TOKEN_SCHEME: &str = "Token ";

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header was sent.
    #[error("no authorization header")]
    MissingHeader,

    /// The header does not use the `Token` scheme.
    #[error("no Token found")]
    WrongScheme,

    /// The verifier refused the token.
    #[error("token rejected: {0}")]
    Rejected(String),
}

/// The acting user of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from a user name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a raw token to an identity.
///
/// Implement this to plug in signed or expiring tokens without touching
/// the request handlers.
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the identity it names.
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Uses the token verbatim as the identity.
///
/// There is no signature, expiry, or revocation: anyone who knows a user
/// name can act as that user. Suitable only behind a trusted front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTokenVerifier;

impl IdentityVerifier for PlainTokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        Ok(Identity::new(token))
    }
}

/// Extract the token from an Authorization header value.
///
/// The remainder after the prefix may be empty.
pub fn extract_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    header
        .strip_prefix(TOKEN_SCHEME)
        .ok_or(AuthError::WrongScheme)
}

/// Parses the Authorization header and verifies the token.
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn IdentityVerifier>,
}

impl Authenticator {
    /// Create an authenticator backed by `verifier`.
    pub fn new(verifier: impl IdentityVerifier + 'static) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// Authenticator using [`PlainTokenVerifier`].
    pub fn plain() -> Self {
        Self::new(PlainTokenVerifier)
    }

    /// Resolve the caller's identity from an Authorization header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let token = extract_token(header)?;
        self.verifier.verify(token)
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::plain()
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}
