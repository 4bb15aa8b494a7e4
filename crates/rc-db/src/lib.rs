//! Paste Store and Task Queue backends.
//!
//! Two implementations share the [`PasteStore`] + [`TaskQueue`] contract: an
//! in-memory map for single-process development, and a Postgres-backed one
//! for production. The in-memory backend answers queue operations but
//! reports `supports_queue() == false` so a worker pool can refuse to start
//! against it rather than silently starving.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use rc_schemas::Error;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod memory;
pub mod postgres_store;
pub mod store;

pub use memory::MemoryStore;
pub use postgres_store::PostgresStore;
pub use store::{PasteStore, Store, TaskQueue};

pub const ENV_DB_URL: &str = "RC_DATABASE_URL";

/// Deadline for establishing the initial pool connection (spec §5).
pub const CONNECT_DEADLINE: Duration = Duration::from_secs(5);

/// Deadline per individual store/queue operation (spec §5).
pub const STORE_OP_DEADLINE: Duration = Duration::from_secs(3);

/// Wrap a store/queue call with the standard 3-second operation deadline,
/// surfacing an expiry as `Error::Backend` rather than letting it hang a
/// worker consumer or an HTTP handler indefinitely.
pub async fn with_deadline<T, F>(fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(STORE_OP_DEADLINE, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::backend(anyhow::anyhow!(
            "store operation exceeded the {}s deadline",
            STORE_OP_DEADLINE.as_secs()
        ))),
    }
}

/// Connect to Postgres at `dsn`, bounded by [`CONNECT_DEADLINE`].
pub async fn connect(dsn: &str) -> Result<PgPool> {
    let pool = tokio::time::timeout(
        CONNECT_DEADLINE,
        PgPoolOptions::new().max_connections(10).connect(dsn),
    )
    .await
    .context("connecting to Postgres exceeded the connect deadline")?
    .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Connect to Postgres using `RC_DATABASE_URL`, bounded by [`CONNECT_DEADLINE`].
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Test helper: connect via `RC_DATABASE_URL` and ensure migrations are applied.
pub async fn testkit_db_pool() -> Result<PgPool> {
    let pool = connect_from_env().await?;
    migrate(&pool).await?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_pastes_table: bool,
}

pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = 'public' and table_name = 'pastes'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_pastes_table: exists,
    })
}
