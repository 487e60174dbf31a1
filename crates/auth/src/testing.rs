//! Minimal store doubles for unit tests in this crate.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use bookly_core::{StoreError, StoreResult, TokenId, UserId};

use crate::{Identity, IdentityPatch, IdentityStore, RevocationStore};

#[derive(Debug, Default)]
pub struct MemoryRevocations {
    revoked: Mutex<HashSet<TokenId>>,
}

#[async_trait]
impl RevocationStore for MemoryRevocations {
    async fn revoke(&self, token_id: TokenId) -> StoreResult<()> {
        self.revoked.lock().unwrap().insert(token_id);
        Ok(())
    }

    async fn revoke_for(&self, token_id: TokenId, _min_ttl: Duration) -> StoreResult<()> {
        self.revoke(token_id).await
    }

    async fn is_revoked(&self, token_id: TokenId) -> StoreResult<bool> {
        Ok(self.revoked.lock().unwrap().contains(&token_id))
    }
}

/// A revocation store whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingRevocations;

#[async_trait]
impl RevocationStore for FailingRevocations {
    async fn revoke(&self, _token_id: TokenId) -> StoreResult<()> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn revoke_for(&self, _token_id: TokenId, _min_ttl: Duration) -> StoreResult<()> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn is_revoked(&self, _token_id: TokenId) -> StoreResult<bool> {
        Err(StoreError::unavailable("connection refused"))
    }
}

#[derive(Debug, Default)]
pub struct MemoryIdentities {
    users: Mutex<HashMap<UserId, Identity>>,
}

impl MemoryIdentities {
    pub fn with(identities: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            users: Mutex::new(identities.into_iter().map(|i| (i.id, i)).collect()),
        }
    }

    pub fn remove(&self, id: UserId) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentities {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: UserId, patch: IdentityPatch) -> StoreResult<()> {
        let mut users = self.users.lock().unwrap();
        let identity = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply(identity);
        Ok(())
    }
}

/// An identity store whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingIdentities;

#[async_trait]
impl IdentityStore for FailingIdentities {
    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<Identity>> {
        Err(StoreError::unavailable("pool timed out"))
    }

    async fn find_by_id(&self, _id: UserId) -> StoreResult<Option<Identity>> {
        Err(StoreError::unavailable("pool timed out"))
    }

    async fn update(&self, _id: UserId, _patch: IdentityPatch) -> StoreResult<()> {
        Err(StoreError::unavailable("pool timed out"))
    }
}
