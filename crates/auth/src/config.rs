//! Auth configuration (built once at process start, then shared read-only).

use std::time::Duration;

use thiserror::Error;

use crate::authorize::RoleGate;
use crate::codec::SigningAlgorithm;
use crate::{Role, RoleSet};

pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(2 * 24 * 60 * 60);
pub const DEFAULT_REVOCATION_TTL: Duration = DEFAULT_ACCESS_TOKEN_TTL;
/// Upper bound for every ttl setting.
pub const MAX_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// HMAC signing secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("{0} must be at least one second")]
    ZeroTtl(&'static str),

    #[error("{0} must not exceed {max} seconds", max = MAX_TTL.as_secs())]
    TtlTooLong(&'static str),

    #[error("refresh token ttl must be longer than access token ttl")]
    RefreshNotLonger,

    #[error("revocation ttl must cover the access token ttl")]
    RevocationTooShort,

    #[error("at least one valid role is required")]
    NoRoles,

    #[error("unknown role '{0}'")]
    UnknownRole(Role),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings for token issuance, verification and revocation.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_secret: SigningSecret,
    pub algorithm: SigningAlgorithm,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// How long a revocation entry lives in the store.
    pub revocation_ttl: Duration,
    pub valid_roles: RoleSet,
}

impl AuthConfig {
    /// Defaults for everything except the secret.
    pub fn new(signing_secret: SigningSecret) -> Self {
        Self {
            signing_secret,
            algorithm: SigningAlgorithm::default(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            revocation_ttl: DEFAULT_REVOCATION_TTL,
            valid_roles: RoleSet::from([Role::ADMIN, Role::USER]),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.access_token_ttl.as_secs() == 0 {
            return Err(ConfigError::ZeroTtl("access token ttl"));
        }
        if self.refresh_token_ttl.as_secs() == 0 {
            return Err(ConfigError::ZeroTtl("refresh token ttl"));
        }
        if self.revocation_ttl.as_secs() == 0 {
            return Err(ConfigError::ZeroTtl("revocation ttl"));
        }
        for (name, ttl) in [
            ("access token ttl", self.access_token_ttl),
            ("refresh token ttl", self.refresh_token_ttl),
            ("revocation ttl", self.revocation_ttl),
        ] {
            if ttl > MAX_TTL {
                return Err(ConfigError::TtlTooLong(name));
            }
        }
        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(ConfigError::RefreshNotLonger);
        }
        // A shorter entry would let a logged-out access token come back to life.
        if self.revocation_ttl < self.access_token_ttl {
            return Err(ConfigError::RevocationTooShort);
        }
        if self.valid_roles.is_empty() {
            return Err(ConfigError::NoRoles);
        }
        Ok(())
    }

    /// Build an authorization gate for an operation, checking every role is known.
    pub fn role_gate<I>(&self, permitted: I) -> Result<RoleGate, ConfigError>
    where
        I: IntoIterator<Item = Role>,
    {
        RoleGate::new(permitted.into_iter().collect(), &self.valid_roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(SigningSecret::new("secret"))
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = config();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.refresh_token_ttl, Duration::from_secs(172_800));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let cfg = AuthConfig::new(SigningSecret::new(Vec::new()));
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySecret));
    }

    #[test]
    fn refresh_must_outlive_access() {
        let mut cfg = config();
        cfg.refresh_token_ttl = cfg.access_token_ttl;
        assert_eq!(cfg.validate(), Err(ConfigError::RefreshNotLonger));
    }

    #[test]
    fn revocation_must_cover_access() {
        let mut cfg = config();
        cfg.revocation_ttl = Duration::from_secs(60);
        assert_eq!(cfg.validate(), Err(ConfigError::RevocationTooShort));
    }

    #[test]
    fn ttls_are_capped() {
        let mut cfg = config();
        cfg.revocation_ttl = Duration::from_secs(u64::MAX);
        assert_eq!(cfg.validate(), Err(ConfigError::TtlTooLong("revocation ttl")));

        let mut cfg = config();
        cfg.refresh_token_ttl = MAX_TTL + Duration::from_secs(1);
        assert_eq!(cfg.validate(), Err(ConfigError::TtlTooLong("refresh token ttl")));

        let mut cfg = config();
        cfg.refresh_token_ttl = MAX_TTL;
        cfg.revocation_ttl = MAX_TTL;
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn role_gate_rejects_unknown_roles() {
        let cfg = config();
        assert!(cfg.role_gate([Role::ADMIN]).is_ok());
        assert_eq!(
            cfg.role_gate([Role::ADMIN, Role::new("owner")]).unwrap_err(),
            ConfigError::UnknownRole(Role::new("owner"))
        );
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
