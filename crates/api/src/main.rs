use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use bookly_api::{AppState, build_app};
use bookly_auth::{BcryptVerifier, IdentityStore, RevocationStore};
use bookly_infra::{InMemoryIdentityStore, InMemoryRevocationStore, PostgresIdentityStore, RedisRevocationStore, Settings};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bookly_observability::init();

    let settings = Settings::from_env().context("invalid configuration")?;
    if settings.used_dev_secret {
        warn!("JWT_SECRET not set; using insecure dev default");
    }

    let revocations = revocation_store(&settings).await?;
    let identities = identity_store(&settings).await?;

    let state = AppState::new(
        &settings.auth,
        identities,
        revocations,
        Arc::new(BcryptVerifier::new()),
        settings.server.auth_timeout,
    )
    .context("invalid auth configuration")?;

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(settings.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_addr))?;

    info!(
        addr = %listener.local_addr()?,
        algorithm = %settings.auth.algorithm,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn revocation_store(settings: &Settings) -> anyhow::Result<Arc<dyn RevocationStore>> {
    let ttl = settings.auth.revocation_ttl;
    match &settings.server.redis_url {
        Some(url) => {
            let store = RedisRevocationStore::connect(url, ttl)
                .await
                .context("failed to connect to redis")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("REDIS_URL not set; revocations are kept in process memory");
            let store = InMemoryRevocationStore::arc(ttl);
            Arc::clone(&store).spawn_purger(PURGE_INTERVAL);
            Ok(store)
        }
    }
}

async fn identity_store(settings: &Settings) -> anyhow::Result<Arc<dyn IdentityStore>> {
    match &settings.server.database_url {
        Some(url) => {
            let store = PostgresIdentityStore::connect(url)
                .await
                .context("failed to connect to postgres")?;
            store.ensure_schema().await.context("failed to prepare users table")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set; using an empty in-memory identity store");
            Ok(InMemoryIdentityStore::arc())
        }
    }
}
