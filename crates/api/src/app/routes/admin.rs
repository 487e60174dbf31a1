//! Admin routes. Mounted behind the access layer and the admin role gate.

use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::info;

use bookly_auth::{IdentityPatch, IdentityStore, Role};
use bookly_core::{TokenId, UserId};

use crate::app::dto::{RoleUpdatedResponse, TokenRevokedResponse, UpdateRoleRequest};
use crate::app::{AppState, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/users/:id/role", post(update_role))
        .route("/tokens/:jti/revoke", post(revoke_token))
}

/// POST /admin/users/:id/role
///
/// Takes effect on the user's next request; existing tokens are not reissued.
pub async fn update_role(
    Extension(state): Extension<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    let role = Role::new(body.role.trim().to_lowercase());
    if !state.valid_roles.contains(&role) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_role",
            format!("role must be one of: {}", state.valid_roles),
        );
    }

    if let Err(e) = state.identities.update(user_id, IdentityPatch::role(role.clone())).await {
        return errors::store_error_to_response(e);
    }

    info!(admin_id = %admin.identity().id, %user_id, %role, "role updated");

    Json(RoleUpdatedResponse {
        uid: user_id,
        role: role.to_string(),
    })
    .into_response()
}

/// POST /admin/tokens/:jti/revoke
pub async fn revoke_token(
    Extension(state): Extension<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(jti): Path<String>,
) -> axum::response::Response {
    let token_id: TokenId = match jti.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid token id"),
    };

    if let Err(e) = state.sessions.revoke_token(token_id).await {
        return errors::auth_error_to_response(e);
    }

    info!(admin_id = %admin.identity().id, jti = %token_id, "token revoked by admin");

    (
        StatusCode::OK,
        Json(TokenRevokedResponse {
            message: "Token revoked",
            jti: token_id,
        }),
    )
        .into_response()
}
