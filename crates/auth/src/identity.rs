//! Identity projection and the persistence boundary it is loaded through.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use bookly_core::{StoreResult, UserId};

use crate::{Role, SubjectClaims};

/// The slice of a user record the auth core cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,

    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Identity {
    /// Claims for an access token (carries the role).
    pub fn access_claims(&self) -> SubjectClaims {
        SubjectClaims {
            user_uid: self.id,
            email: self.email.clone(),
            role: Some(self.role.clone()),
        }
    }

    /// Claims for a refresh token (no role; it is re-read on every request anyway).
    pub fn refresh_claims(&self) -> SubjectClaims {
        SubjectClaims {
            user_uid: self.id,
            email: self.email.clone(),
            role: None,
        }
    }
}

/// Partial update for an identity. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPatch {
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
    pub password_hash: Option<String>,
}

impl IdentityPatch {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.is_verified.is_none() && self.password_hash.is_none()
    }

    pub fn apply(&self, identity: &mut Identity) {
        if let Some(role) = &self.role {
            identity.role = role.clone();
        }
        if let Some(verified) = self.is_verified {
            identity.is_verified = verified;
        }
        if let Some(hash) = &self.password_hash {
            identity.password_hash = hash.clone();
        }
    }
}

/// Outbound interface to the persistence layer that owns user records.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>>;

    /// Fails with `StoreError::NotFound` when `id` does not exist.
    async fn update(&self, id: UserId, patch: IdentityPatch) -> StoreResult<()>;
}

#[async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        (**self).find_by_id(id).await
    }

    async fn update(&self, id: UserId, patch: IdentityPatch) -> StoreResult<()> {
        (**self).update(id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::new(),
            email: "a@x.com".to_string(),
            role: Role::USER,
            is_verified: false,
            password_hash: "hash".to_string(),
        }
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut id = identity();
        IdentityPatch {
            is_verified: Some(true),
            ..IdentityPatch::default()
        }
        .apply(&mut id);
        assert!(id.is_verified);
        assert_eq!(id.role, Role::USER);
        assert_eq!(id.password_hash, "hash");
    }

    #[test]
    fn password_hash_never_serializes() {
        let json = serde_json::to_value(identity()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn refresh_claims_drop_the_role() {
        let id = identity();
        assert_eq!(id.access_claims().role, Some(Role::USER));
        assert_eq!(id.refresh_claims().role, None);
        assert_eq!(id.refresh_claims().user_uid, id.id);
    }
}
