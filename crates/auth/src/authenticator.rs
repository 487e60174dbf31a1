//! Bearer token authentication.
//!
//! One authenticator, parameterized by the token kind it accepts. The access
//! and refresh variants differ only in that parameter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::claims::validate_claims;
use crate::{AuthError, RevocationStore, TokenClaims, TokenCodec, TokenKind};

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively (`Bearer`, `bearer`).
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or(AuthError::MissingCredential)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

#[derive(Clone)]
pub struct BearerAuthenticator {
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
    expected: TokenKind,
}

impl BearerAuthenticator {
    pub fn new(codec: Arc<TokenCodec>, revocations: Arc<dyn RevocationStore>, expected: TokenKind) -> Self {
        Self {
            codec,
            revocations,
            expected,
        }
    }

    /// Accepts access tokens only.
    pub fn access(codec: Arc<TokenCodec>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self::new(codec, revocations, TokenKind::Access)
    }

    /// Accepts refresh tokens only.
    pub fn refresh(codec: Arc<TokenCodec>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self::new(codec, revocations, TokenKind::Refresh)
    }

    pub fn expected_kind(&self) -> TokenKind {
        self.expected
    }

    /// Authenticate a raw `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<TokenClaims, AuthError> {
        let token = extract_bearer(authorization)?;
        self.verify(token, Utc::now()).await
    }

    /// Run the checks on an already extracted token, in order:
    /// signature, expiry, kind, revocation.
    pub async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let claims: TokenClaims = self.codec.decode(token).map_err(|e| {
            debug!(error = %e, "token failed to decode");
            AuthError::InvalidToken
        })?;

        if let Err(e) = validate_claims(&claims, now) {
            debug!(jti = %claims.jti, error = %e, "token outside its validity window");
            return Err(AuthError::InvalidToken);
        }

        let found = claims.kind();
        if found != self.expected {
            debug!(jti = %claims.jti, expected = %self.expected, %found, "wrong token kind");
            return Err(AuthError::WrongTokenKind {
                expected: self.expected,
                found,
            });
        }

        if self.revocations.is_revoked(claims.jti).await? {
            debug!(jti = %claims.jti, "token is revoked");
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }
}
