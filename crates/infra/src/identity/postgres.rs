//! Postgres-backed identity store.
//!
//! Reads and patches rows of the `users` table. Only the columns the auth
//! core needs are touched; the rest of the user record is owned elsewhere.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolTimedOut, PoolClosed, Io, Tls | `Unavailable` |
//! | anything else | `Backend` |

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use bookly_auth::{Identity, IdentityPatch, IdentityStore, Role};
use bookly_core::{StoreError, StoreResult, UserId};

const SELECT_BY_EMAIL: &str = r#"
    SELECT uid, email, role, is_verified, password_hash
    FROM users
    WHERE email = $1
"#;

const SELECT_BY_ID: &str = r#"
    SELECT uid, email, role, is_verified, password_hash
    FROM users
    WHERE uid = $1
"#;

const UPDATE_BY_ID: &str = r#"
    UPDATE users
    SET role = COALESCE($2, role),
        is_verified = COALESCE($3, is_verified),
        password_hash = COALESCE($4, password_hash)
    WHERE uid = $1
"#;

/// Creates the table when missing. Used by dev setups and integration tests.
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        uid UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'user',
        is_verified BOOLEAN NOT NULL DEFAULT FALSE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

#[derive(Debug, Clone)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small pool to `database_url`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn fetch_one_by(&self, sql: &'static str, op: &'static str, bind: Bind<'_>) -> StoreResult<Option<Identity>> {
        let query = sqlx::query(sql);
        let query = match bind {
            Bind::Email(email) => query.bind(email),
            Bind::Id(id) => query.bind(id),
        };
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(op, e))?;

        row.as_ref().map(identity_from_row).transpose()
    }
}

enum Bind<'a> {
    Email(&'a str),
    Id(Uuid),
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        self.fetch_one_by(SELECT_BY_EMAIL, "find_by_email", Bind::Email(email)).await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        self.fetch_one_by(SELECT_BY_ID, "find_by_id", Bind::Id(*id.as_uuid())).await
    }

    #[instrument(skip(self, patch), fields(user_id = %id))]
    async fn update(&self, id: UserId, patch: IdentityPatch) -> StoreResult<()> {
        let result = sqlx::query(UPDATE_BY_ID)
            .bind(*id.as_uuid())
            .bind(patch.role.as_ref().map(|r| r.as_str().to_string()))
            .bind(patch.is_verified)
            .bind(patch.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn identity_from_row(row: &sqlx::postgres::PgRow) -> StoreResult<Identity> {
    let read = |e: sqlx::Error| StoreError::backend(format!("malformed users row: {e}"));

    let uid: Uuid = row.try_get("uid").map_err(read)?;
    let role: String = row.try_get("role").map_err(read)?;
    Ok(Identity {
        id: UserId::from_uuid(uid),
        email: row.try_get("email").map_err(read)?,
        role: Role::new(role),
        is_verified: row.try_get("is_verified").map_err(read)?,
        password_hash: row.try_get("password_hash").map_err(read)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::unavailable(format!("tls error in {operation}: {e}")),
        other => StoreError::backend(format!("sqlx error in {operation}: {other}")),
    }
}
