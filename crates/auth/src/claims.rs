use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bookly_core::{TokenId, UserId};

use crate::Role;

/// Which of the two token flavours a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived, authorizes ordinary requests.
    Access,
    /// Long-lived, only good for minting new access tokens.
    Refresh,
}

impl TokenKind {
    pub fn from_refresh_flag(refresh: bool) -> Self {
        if refresh { Self::Refresh } else { Self::Access }
    }

    pub fn is_refresh(self) -> bool {
        matches!(self, Self::Refresh)
    }
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

/// Identity attributes carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectClaims {
    pub user_uid: UserId,
    pub email: String,

    /// Present on access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Decoded token payload.
///
/// Generic over the subject so the codec stays agnostic of what the
/// application puts into `user`; `SubjectClaims` is what Bookly uses.
///
/// Timestamps travel as JWT NumericDate (whole seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims<S = SubjectClaims> {
    /// Caller supplied subject claims.
    pub user: S,

    /// Unique per issuance; the revocation key.
    pub jti: TokenId,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    pub refresh: bool,
}

impl<S> TokenClaims<S> {
    pub fn kind(&self) -> TokenKind {
        TokenKind::from_refresh_flag(self.refresh)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Check the time window of already decoded claims.
///
/// Signature verification happens in the codec; this is the expiry policy the
/// codec deliberately does not apply.
pub fn validate_claims<S>(claims: &TokenClaims<S>, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if claims.is_expired_at(now) {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
