//! `bookly-auth`: token authentication and session revocation core.
//!
//! This crate is intentionally decoupled from HTTP and from concrete storage:
//! persistence and the revocation blocklist are reached through traits.

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod revocation;
pub mod roles;
pub mod session;

#[cfg(test)]
mod testing;

pub use authenticator::{BearerAuthenticator, extract_bearer};
pub use authorize::{RoleGate, authorize};
pub use claims::{SubjectClaims, TokenClaims, TokenKind, TokenValidationError, validate_claims};
pub use codec::{CodecError, IssuedToken, SigningAlgorithm, TokenCodec};
pub use config::{AuthConfig, ConfigError, SigningSecret};
pub use credentials::{BcryptVerifier, CredentialVerifier, hash_password};
pub use error::AuthError;
pub use identity::{Identity, IdentityPatch, IdentityStore};
pub use resolver::IdentityResolver;
pub use revocation::RevocationStore;
pub use roles::{Role, RoleSet};
pub use session::{LoginOutcome, SessionManager};
