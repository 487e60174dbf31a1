//! Configuration loading from the process environment.
//!
//! Every variable is optional; missing ones fall back to the defaults in
//! `bookly_auth::config`. `from_lookup` takes the variable source as a
//! function so tests never touch the real environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use bookly_auth::{AuthConfig, ConfigError, RoleSet, SigningAlgorithm, SigningSecret};

/// Used when `JWT_SECRET` is unset. Only fit for local development.
pub const DEV_SECRET: &str = "bookly-dev-secret";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// Upper bound on authenticating a single request (decode, revocation
    /// lookup, identity load).
    pub auth_timeout: Duration,
    pub redis_url: Option<String>,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthConfig,
    pub server: ServerSettings,
    /// True when `JWT_SECRET` was missing and `DEV_SECRET` is in use.
    pub used_dev_secret: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let (secret, used_dev_secret) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_SECRET.to_string(), true),
        };

        let mut auth = AuthConfig::new(SigningSecret::new(secret));

        if let Some(raw) = get("JWT_ALGORITHM") {
            auth.algorithm = SigningAlgorithm::from_str(&raw)
                .map_err(|reason| ConfigError::Invalid { key: "JWT_ALGORITHM", reason })?;
        }
        if let Some(raw) = get("ACCESS_TOKEN_EXPIRY_SECS") {
            auth.access_token_ttl = parse_secs("ACCESS_TOKEN_EXPIRY_SECS", &raw)?;
        }
        if let Some(raw) = get("REFRESH_TOKEN_EXPIRY_SECS") {
            auth.refresh_token_ttl = parse_secs("REFRESH_TOKEN_EXPIRY_SECS", &raw)?;
        }
        match get("JTI_EXPIRY_SECS") {
            Some(raw) => auth.revocation_ttl = parse_secs("JTI_EXPIRY_SECS", &raw)?,
            // Keep revocation entries alive as long as the tokens they block.
            None => auth.revocation_ttl = auth.access_token_ttl,
        }
        if let Some(raw) = get("VALID_ROLES") {
            auth.valid_roles = RoleSet::parse_list(&raw);
        }

        auth.validate()?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let auth_timeout = match get("AUTH_TIMEOUT_MS") {
            Some(raw) => {
                let ms = parse_u64("AUTH_TIMEOUT_MS", &raw)?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        key: "AUTH_TIMEOUT_MS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => DEFAULT_AUTH_TIMEOUT,
        };

        Ok(Self {
            auth,
            server: ServerSettings {
                bind_addr,
                auth_timeout,
                redis_url: get("REDIS_URL"),
                database_url: get("DATABASE_URL"),
            },
            used_dev_secret,
        })
    }
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_secs(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    parse_u64(key, raw).map(Duration::from_secs)
}
