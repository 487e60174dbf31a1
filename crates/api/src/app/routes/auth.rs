//! Session routes: login, refresh, logout, and the caller's own identity.

use axum::{Extension, Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};

use crate::app::dto::{AccessTokenResponse, LoginRequest, LoginResponse, MessageResponse};
use crate::app::{AppState, errors};
use crate::context::{CurrentUser, RefreshSession};

/// POST /auth/login
pub async fn login(
    Extension(state): Extension<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    match state.sessions.login(&body.email, &body.password).await {
        Ok(outcome) => (StatusCode::OK, Json(LoginResponse::from(outcome))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/refresh_token (refresh bearer)
pub async fn refresh_token(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<RefreshSession>,
) -> axum::response::Response {
    match state.sessions.refresh(session.claims()) {
        Ok(issued) => Json(AccessTokenResponse {
            access_token: issued.token,
        })
        .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/logout (access bearer)
///
/// Revokes only the presented access token.
pub async fn logout(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    match state.sessions.logout(user.claims()).await {
        Ok(()) => Json(MessageResponse {
            message: "Logged Out Successfully",
        })
        .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(user.identity().clone())
}
