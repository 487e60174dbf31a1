use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use bookly_auth::RevocationStore;
use bookly_core::{StoreError, StoreResult, TokenId};

/// In-process revocation store for tests/dev and single-instance deployments.
///
/// Sharded map, so lookups and inserts for different ids do not contend.
/// Expired entries are dropped lazily on lookup and by `purge_expired`.
#[derive(Debug)]
pub struct InMemoryRevocationStore {
    ttl: Duration,
    entries: DashMap<TokenId, Instant>,
}

impl InMemoryRevocationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn arc(ttl: Duration) -> Arc<Self> {
        Arc::new(Self::new(ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held (expired ones included until purged).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry past its expiry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    // Re-revoking never shortens an existing entry.
    fn insert(&self, token_id: TokenId, ttl: Duration) -> StoreResult<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::backend(format!("revocation ttl of {}s is out of range", ttl.as_secs())))?;
        self.entries
            .entry(token_id)
            .and_modify(|current| *current = (*current).max(expires_at))
            .or_insert(expires_at);
        Ok(())
    }

    /// Periodically purge expired entries until the handle is aborted.
    pub fn spawn_purger(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    debug!(purged, "purged expired revocation entries");
                }
            }
        })
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, token_id: TokenId) -> StoreResult<()> {
        self.insert(token_id, self.ttl)
    }

    async fn revoke_for(&self, token_id: TokenId, min_ttl: Duration) -> StoreResult<()> {
        self.insert(token_id, self.ttl.max(min_ttl))
    }

    async fn is_revoked(&self, token_id: TokenId) -> StoreResult<bool> {
        let now = Instant::now();
        let live = match self.entries.get(&token_id) {
            Some(expires_at) => *expires_at > now,
            None => return Ok(false),
        };
        if !live {
            self.entries.remove_if(&token_id, |_, expires_at| *expires_at <= now);
        }
        Ok(live)
    }
}
