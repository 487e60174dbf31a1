//! Route-level role authorization.
//!
//! Runs after `middleware::require_access`, so the identity's role is the
//! one currently stored, not whatever the token was minted with.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use bookly_auth::{AuthError, RoleGate};

use crate::app::errors::auth_error_to_response;
use crate::context::CurrentUser;

pub async fn require_roles(State(gate): State<RoleGate>, req: Request, next: Next) -> Response {
    let verdict = match req.extensions().get::<CurrentUser>() {
        Some(user) => gate.check(user.identity()),
        // Layer ordering bug, not a client problem; still deny.
        None => Err(AuthError::MissingCredential),
    };

    match verdict {
        Ok(()) => next.run(req).await,
        Err(err) => auth_error_to_response(err),
    }
}
