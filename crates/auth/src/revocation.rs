//! Revocation store boundary (token blocklist).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use bookly_core::{StoreResult, TokenId};

/// Expiring set of revoked token identifiers.
///
/// Entries expire on their own, after the store's configured TTL or the
/// longer lifetime asked for in `revoke_for`; there is no delete path.
/// Implementations must let lookups and inserts for different
/// ids proceed independently. A revoke racing a lookup of the same id may be
/// observed late.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Mark one issuance as revoked. Idempotent.
    async fn revoke(&self, token_id: TokenId) -> StoreResult<()>;

    /// Like `revoke`, but the entry lives at least `min_ttl` (and never less
    /// than the configured TTL). Used when the token kind is unknown and the
    /// entry must outlast the longest-lived token.
    async fn revoke_for(&self, token_id: TokenId, min_ttl: Duration) -> StoreResult<()>;

    async fn is_revoked(&self, token_id: TokenId) -> StoreResult<bool>;
}

#[async_trait]
impl<S> RevocationStore for Arc<S>
where
    S: RevocationStore + ?Sized,
{
    async fn revoke(&self, token_id: TokenId) -> StoreResult<()> {
        (**self).revoke(token_id).await
    }

    async fn revoke_for(&self, token_id: TokenId, min_ttl: Duration) -> StoreResult<()> {
        (**self).revoke_for(token_id, min_ttl).await
    }

    async fn is_revoked(&self, token_id: TokenId) -> StoreResult<bool> {
        (**self).is_revoked(token_id).await
    }
}
