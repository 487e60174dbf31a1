use std::future::Future;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::info;

use bookly_auth::AuthError;

use crate::app::AppState;
use crate::app::errors::auth_error_to_response;
use crate::context::{CurrentUser, RefreshSession};

/// Authenticate an access token and resolve its identity.
///
/// On success a `CurrentUser` is attached to the request. Both steps share
/// one deadline (`AppState::auth_timeout`); running out of time is treated
/// as the backend being unavailable.
pub async fn require_access(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let header = authorization(&req);

    let outcome = with_deadline(state.auth_timeout, async {
        let claims = state.access.authenticate(header.as_deref()).await?;
        let identity = state.resolver.resolve(&claims).await?;
        Ok::<_, AuthError>(CurrentUser::new(identity, claims))
    })
    .await;

    match outcome {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => auth_error_to_response(err),
    }
}

/// Authenticate a refresh token. No identity lookup: the refresh endpoint
/// only re-signs the subject the token already carries.
pub async fn require_refresh(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let header = authorization(&req);

    let outcome = with_deadline(state.auth_timeout, state.refresh.authenticate(header.as_deref())).await;

    match outcome {
        Ok(claims) => {
            req.extensions_mut().insert(RefreshSession::new(claims));
            next.run(req).await
        }
        Err(err) => auth_error_to_response(err),
    }
}

/// Log method, path, status and elapsed time for every request.
pub async fn log_request_timing(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request completed"
    );
    response
}

// Non-UTF-8 header values are treated as absent.
fn authorization(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Unavailable(format!(
            "authentication did not finish within {}ms",
            limit.as_millis()
        ))),
    }
}
