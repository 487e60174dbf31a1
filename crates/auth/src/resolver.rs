use std::sync::Arc;

use tracing::debug;

use crate::{AuthError, Identity, IdentityStore, TokenClaims, TokenKind};

/// Loads the current identity behind verified access-token claims.
#[derive(Clone)]
pub struct IdentityResolver {
    identities: Arc<dyn IdentityStore>,
}

impl IdentityResolver {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }

    /// A subject deleted after issuance is `IdentityNotFound`, not a server error.
    pub async fn resolve(&self, claims: &TokenClaims) -> Result<Identity, AuthError> {
        if claims.kind() != TokenKind::Access {
            return Err(AuthError::WrongTokenKind {
                expected: TokenKind::Access,
                found: claims.kind(),
            });
        }

        let user_id = claims.user.user_uid;
        match self.identities.find_by_id(user_id).await? {
            Some(identity) => Ok(identity),
            None => {
                debug!(%user_id, jti = %claims.jti, "token subject no longer exists");
                Err(AuthError::IdentityNotFound)
            }
        }
    }
}
