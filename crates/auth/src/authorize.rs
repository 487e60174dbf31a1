use crate::config::ConfigError;
use crate::{AuthError, Identity, RoleSet};

/// Authorize a resolved identity against the roles an operation permits.
///
/// - No IO
/// - No panics
pub fn authorize(identity: &Identity, permitted: &RoleSet) -> Result<(), AuthError> {
    if permitted.contains(&identity.role) {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole {
            role: identity.role.clone(),
        })
    }
}

/// The permitted role set of one protected operation.
///
/// Built through `AuthConfig::role_gate` so a typo in a role name is caught at
/// startup instead of silently locking everyone out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    permitted: RoleSet,
}

impl RoleGate {
    pub fn new(permitted: RoleSet, valid: &RoleSet) -> Result<Self, ConfigError> {
        if permitted.is_empty() {
            return Err(ConfigError::NoRoles);
        }
        if let Some(unknown) = permitted.missing_from(valid).next() {
            return Err(ConfigError::UnknownRole(unknown.clone()));
        }
        Ok(Self { permitted })
    }

    pub fn permitted(&self) -> &RoleSet {
        &self.permitted
    }

    pub fn check(&self, identity: &Identity) -> Result<(), AuthError> {
        authorize(identity, &self.permitted)
    }
}
