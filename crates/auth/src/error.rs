use thiserror::Error;

use bookly_core::StoreError;

use crate::{Role, TokenKind};

/// Every way authentication or authorization can fail.
///
/// All variants except `Unavailable` and `Issuance` are client errors and
/// terminal for the request. The distinctions are for logs; responses collapse
/// them (see `AuthError::code`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing or malformed bearer credential")]
    MissingCredential,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("expected {expected} token, got {found} token")]
    WrongTokenKind { expected: TokenKind, found: TokenKind },

    #[error("token has been revoked")]
    RevokedToken,

    #[error("role '{role}' is not permitted for this operation")]
    InsufficientRole { role: Role },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("identity not found")]
    IdentityNotFound,

    /// A store we depend on could not answer. Always fail closed.
    #[error("auth backend unavailable: {0}")]
    Unavailable(String),

    #[error("token issuance failed: {0}")]
    Issuance(String),
}

impl AuthError {
    /// Infrastructure failures, as opposed to a rejected credential.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Issuance(_))
    }

    /// Stable, client-safe error code.
    ///
    /// Token problems all share one code so responses do not tell a caller
    /// which check their token failed.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential
            | Self::InvalidToken
            | Self::WrongTokenKind { .. }
            | Self::RevokedToken
            | Self::IdentityNotFound => "unauthorized",
            Self::InsufficientRole { .. } => "forbidden",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unavailable(_) => "service_unavailable",
            Self::Issuance(_) => "internal_error",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
