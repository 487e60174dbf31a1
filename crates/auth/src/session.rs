//! Session lifecycle: login, refresh, logout.
//!
//! These call the codec, stores and verifier directly instead of going
//! through the request authentication pipeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use bookly_core::TokenId;

use crate::claims::validate_claims;
use crate::{
    AuthConfig, AuthError, CredentialVerifier, Identity, IdentityStore, IssuedToken, RevocationStore,
    SubjectClaims, TokenClaims, TokenCodec, TokenKind,
};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    identities: Arc<dyn IdentityStore>,
    revocations: Arc<dyn RevocationStore>,
    verifier: Arc<dyn CredentialVerifier>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionManager {
    pub fn new(
        config: &AuthConfig,
        codec: Arc<TokenCodec>,
        identities: Arc<dyn IdentityStore>,
        revocations: Arc<dyn RevocationStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            codec,
            identities,
            revocations,
            verifier,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    /// Verify email + password and mint an access/refresh pair.
    ///
    /// Unknown email and wrong password are the same error, and take roughly
    /// the same time.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let identity = self.identities.find_by_email(email).await?;

        let verifier = Arc::clone(&self.verifier);
        let stored_hash = identity.as_ref().map(|i| i.password_hash.clone());
        let password = password.to_owned();
        let matched = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verifier.verify(&password, &hash),
            None => {
                verifier.verify_missing(&password);
                false
            }
        })
        .await
        .map_err(|e| AuthError::Unavailable(format!("credential check aborted: {e}")))?;

        let identity = match identity {
            Some(identity) if matched => identity,
            _ => {
                warn!(email, "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let access = self.mint(identity.access_claims(), TokenKind::Access, self.access_ttl)?;
        let refresh = self.mint(identity.refresh_claims(), TokenKind::Refresh, self.refresh_ttl)?;

        info!(
            user_id = %identity.id,
            access_jti = %access.claims.jti,
            refresh_jti = %refresh.claims.jti,
            "login succeeded"
        );

        Ok(LoginOutcome {
            identity,
            access,
            refresh,
        })
    }

    /// Mint a new access token from verified refresh-token claims.
    ///
    /// The refresh token itself is not rotated.
    pub fn refresh(&self, claims: &TokenClaims) -> Result<IssuedToken, AuthError> {
        self.refresh_at(claims, Utc::now())
    }

    pub fn refresh_at(&self, claims: &TokenClaims, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        if claims.kind() != TokenKind::Refresh {
            return Err(AuthError::WrongTokenKind {
                expected: TokenKind::Refresh,
                found: claims.kind(),
            });
        }
        // Checked again here: the codec never rejects on expiry.
        validate_claims(claims, now).map_err(|_| AuthError::InvalidToken)?;

        let access = self.mint(claims.user.clone(), TokenKind::Access, self.access_ttl)?;
        info!(
            user_id = %claims.user.user_uid,
            refresh_jti = %claims.jti,
            access_jti = %access.claims.jti,
            "access token refreshed"
        );
        Ok(access)
    }

    /// Revoke the presented token. Other tokens of the same user stay valid.
    pub async fn logout(&self, claims: &TokenClaims) -> Result<(), AuthError> {
        self.revocations.revoke(claims.jti).await?;
        info!(user_id = %claims.user.user_uid, jti = %claims.jti, "token revoked on logout");
        Ok(())
    }

    /// Forced revocation of one issuance by id.
    ///
    /// The id may belong to a refresh token, so the entry is kept for the
    /// refresh ttl, the longest any issued token can live.
    pub async fn revoke_token(&self, token_id: TokenId) -> Result<(), AuthError> {
        self.revocations.revoke_for(token_id, self.refresh_ttl).await?;
        info!(jti = %token_id, "token revoked");
        Ok(())
    }

    fn mint(&self, subject: SubjectClaims, kind: TokenKind, ttl: Duration) -> Result<IssuedToken, AuthError> {
        self.codec
            .encode(subject, kind, ttl)
            .map_err(|e| AuthError::Issuance(e.to_string()))
    }
}
