use bookly_auth::{Identity, TokenClaims};
use bookly_core::TokenId;

/// Authenticated caller for a request: the verified access token and the
/// identity it resolved to.
///
/// Inserted by `middleware::require_access`; handlers behind that layer can
/// rely on it being present.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    identity: Identity,
    claims: TokenClaims,
}

impl CurrentUser {
    pub fn new(identity: Identity, claims: TokenClaims) -> Self {
        Self { identity, claims }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn token_id(&self) -> TokenId {
        self.claims.jti
    }
}

/// Verified refresh-token claims, inserted by `middleware::require_refresh`.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    claims: TokenClaims,
}

impl RefreshSession {
    pub fn new(claims: TokenClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}
