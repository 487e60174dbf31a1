use serde::{Deserialize, Serialize};

use bookly_auth::LoginOutcome;
use bookly_core::{TokenId, UserId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub email: String,
    pub uid: UserId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            message: "Login successful",
            access_token: outcome.access.token,
            refresh_token: outcome.refresh.token,
            user: UserSummary {
                email: outcome.identity.email,
                uid: outcome.identity.id,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdatedResponse {
    pub uid: UserId,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TokenRevokedResponse {
    pub message: &'static str,
    pub jti: TokenId,
}
