use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{debug, error};

use bookly_auth::AuthError;
use bookly_core::StoreError;

/// Map an auth failure to its HTTP response.
///
/// The body carries only the generic code; the precise variant goes to the log.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    let status = match &err {
        AuthError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
        AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Issuance(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };

    if err.is_infrastructure() {
        error!(error = %err, "auth infrastructure failure");
    } else {
        debug!(error = ?err, "request rejected");
    }

    let message = match &err {
        AuthError::InsufficientRole { .. } => "insufficient role for this operation",
        AuthError::InvalidCredentials => "invalid email or password",
        AuthError::Unavailable(_) => "authentication is temporarily unavailable",
        AuthError::Issuance(_) => "internal error",
        _ => "invalid or missing credentials",
    };

    json_error(status, err.code(), message)
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        other => auth_error_to_response(other.into()),
    }
}

/// Malformed or mistyped request bodies get the same JSON envelope as every
/// other error.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    debug!(error = %rejection, "request body rejected");
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
