//! Redis-backed revocation store (optional, `redis` feature).
//!
//! One key per revoked token id, written with `SET key "" EX ttl`, so Redis
//! expires entries on its own. Every command is bounded by a timeout; a slow
//! or unreachable Redis surfaces as `StoreError::Unavailable` and callers deny
//! the request.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{error, info};

use bookly_auth::RevocationStore;
use bookly_core::{StoreError, StoreResult, TokenId};

pub const DEFAULT_KEY_PREFIX: &str = "bookly:revoked:";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct RedisRevocationStore {
    manager: ConnectionManager,
    ttl_secs: u64,
    prefix: String,
    command_timeout: Duration,
}

impl RedisRevocationStore {
    /// Connect to Redis. Entries live for `ttl` (rounded up to whole seconds).
    pub async fn connect(redis_url: &str, ttl: Duration) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::backend(format!("invalid redis url: {e}")))?;

        let manager = tokio::time::timeout(DEFAULT_COMMAND_TIMEOUT * 10, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::unavailable("timed out connecting to redis"))?
            .map_err(|e| StoreError::unavailable(format!("failed to connect to redis: {e}")))?;

        info!("connected to redis revocation store");

        Ok(Self {
            manager,
            ttl_secs: ttl_to_secs(ttl),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn key(&self, token_id: TokenId) -> String {
        format!("{}{}", self.prefix, token_id)
    }

    async fn run<T>(&self, cmd: redis::Cmd, op: &'static str) -> StoreResult<T>
    where
        T: redis::FromRedisValue,
    {
        let mut conn = self.manager.clone();
        match tokio::time::timeout(self.command_timeout, cmd.query_async(&mut conn)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(op, error = %e, "redis command failed");
                Err(StoreError::unavailable(format!("redis {op} failed: {e}")))
            }
            Err(_) => {
                error!(op, timeout_ms = self.command_timeout.as_millis() as u64, "redis command timed out");
                Err(StoreError::unavailable(format!("redis {op} timed out")))
            }
        }
    }
}

fn ttl_to_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    let secs = if ttl.subsec_nanos() > 0 { secs.saturating_add(1) } else { secs };
    secs.max(1)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    // NX: a plain revoke never shortens a longer entry already in place.
    async fn revoke(&self, token_id: TokenId) -> StoreResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(token_id)).arg("").arg("EX").arg(self.ttl_secs).arg("NX");
        self.run::<Option<String>>(cmd, "SET").await.map(|_| ())
    }

    async fn revoke_for(&self, token_id: TokenId, min_ttl: Duration) -> StoreResult<()> {
        let ttl_secs = self.ttl_secs.max(ttl_to_secs(min_ttl));
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(token_id)).arg("").arg("EX").arg(ttl_secs);
        self.run::<()>(cmd, "SET").await
    }

    async fn is_revoked(&self, token_id: TokenId) -> StoreResult<bool> {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(self.key(token_id));
        let count: i64 = self.run(cmd, "EXISTS").await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_rounds_up_to_whole_seconds() {
        assert_eq!(ttl_to_secs(Duration::from_secs(3600)), 3600);
        assert_eq!(ttl_to_secs(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_to_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_to_secs(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn unreachable_redis_fails_to_connect() {
        // Nothing listens on port 1.
        let result = RedisRevocationStore::connect("redis://127.0.0.1:1/", Duration::from_secs(60)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    // Needs a live server: REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn revoke_sets_an_expiring_key() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            return;
        };
        let prefix = format!("bookly:test:{}:", TokenId::generate());
        let store = RedisRevocationStore::connect(&url, Duration::from_secs(1))
            .await
            .unwrap()
            .with_prefix(prefix);

        let id = TokenId::generate();
        let other = TokenId::generate();
        assert!(!store.is_revoked(id).await.unwrap());

        store.revoke(id).await.unwrap();
        store.revoke(id).await.unwrap();
        assert!(store.is_revoked(id).await.unwrap());
        assert!(!store.is_revoked(other).await.unwrap());

        store.revoke_for(other, Duration::from_secs(5)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(!store.is_revoked(id).await.unwrap());
        assert!(store.is_revoked(other).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_url_is_a_backend_error() {
        let result = RedisRevocationStore::connect("not a url", Duration::from_secs(60)).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
