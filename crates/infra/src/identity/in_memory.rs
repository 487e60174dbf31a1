use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use bookly_auth::{Identity, IdentityPatch, IdentityStore};
use bookly_core::{StoreError, StoreResult, UserId};

/// In-memory identity store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<HashMap<UserId, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace a record.
    pub fn insert(&self, identity: Identity) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(identity.id, identity);
        Ok(())
    }

    pub fn remove(&self, id: UserId) -> StoreResult<Option<Identity>> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id))
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("identity store lock poisoned")
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|i| i.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn update(&self, id: UserId, patch: IdentityPatch) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let identity = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply(identity);
        Ok(())
    }
}
