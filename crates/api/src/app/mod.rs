//! HTTP API application wiring (Axum router + state).
//!
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Extension, Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower::ServiceBuilder;

use bookly_auth::{
    AuthConfig, BearerAuthenticator, ConfigError, CredentialVerifier, IdentityResolver, IdentityStore,
    RevocationStore, Role, RoleGate, RoleSet, SessionManager, TokenCodec,
};

use crate::{authz, middleware};

pub mod dto;
pub mod errors;
pub mod routes;

/// Everything the handlers and auth layers share. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub access: BearerAuthenticator,
    pub refresh: BearerAuthenticator,
    pub resolver: IdentityResolver,
    pub sessions: SessionManager,
    pub identities: Arc<dyn IdentityStore>,
    pub valid_roles: RoleSet,
    pub admin_gate: RoleGate,
    pub auth_timeout: Duration,
}

impl AppState {
    pub fn new(
        config: &AuthConfig,
        identities: Arc<dyn IdentityStore>,
        revocations: Arc<dyn RevocationStore>,
        verifier: Arc<dyn CredentialVerifier>,
        auth_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let codec = Arc::new(TokenCodec::from_config(config));
        let sessions = SessionManager::new(
            config,
            Arc::clone(&codec),
            Arc::clone(&identities),
            Arc::clone(&revocations),
            verifier,
        );

        Ok(Self {
            access: BearerAuthenticator::access(Arc::clone(&codec), Arc::clone(&revocations)),
            refresh: BearerAuthenticator::refresh(codec, revocations),
            resolver: IdentityResolver::new(Arc::clone(&identities)),
            sessions,
            identities,
            valid_roles: config.valid_roles.clone(),
            admin_gate: config.role_gate([Role::ADMIN])?,
            auth_timeout,
        })
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(state: AppState) -> Router {
    let access = from_fn_with_state(state.clone(), middleware::require_access);
    let refresh = from_fn_with_state(state.clone(), middleware::require_refresh);
    let admin_only = from_fn_with_state(state.admin_gate.clone(), authz::require_roles);

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login));

    let refresh_protected = Router::new()
        .route("/auth/refresh_token", get(routes::auth::refresh_token))
        .route_layer(refresh);

    let access_protected = Router::new()
        .route("/auth/logout", get(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        .route_layer(access.clone());

    // Layers run bottom-up: authenticate first, then check the role.
    let admin = Router::new()
        .nest("/admin", routes::admin::router())
        .route_layer(admin_only)
        .route_layer(access);

    Router::new()
        .merge(public)
        .merge(refresh_protected)
        .merge(access_protected)
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::log_request_timing))
                .layer(Extension(state)),
        )
}
