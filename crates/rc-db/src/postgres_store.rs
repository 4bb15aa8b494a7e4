use anyhow::{anyhow, Context};
use async_trait::async_trait;
use rc_schemas::{Error, Paste, PasteStatus};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store::{PasteStore, Store, TaskQueue};

/// Relational backend. Every operation is issued against a shared `PgPool`;
/// callers are expected to bound overall latency with their own timeout
/// (the daemon and worker wrap calls in `tokio::time::timeout`).
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_paste(row: sqlx::postgres::PgRow) -> anyhow::Result<Paste> {
    let status_str: String = row.try_get("status")?;
    let status = PasteStatus::from_str(&status_str)
        .ok_or_else(|| anyhow!("unrecognized status in row: {status_str}"))?;

    Ok(Paste {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        language: row.try_get("language")?,
        stdin: row.try_get("stdin")?,
        stdout: row.try_get("stdout")?,
        stderr: row.try_get("stderr")?,
        compile_log: row.try_get("compile_log")?,
        status,
        execution_time_ms: row.try_get("execution_time_ms")?,
        memory_usage_kb: row.try_get("memory_usage_kb")?,
        backend: row.try_get("backend")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl PasteStore for PostgresStore {
    async fn save(&self, paste: &Paste) -> Result<(), Error> {
        sqlx::query(
            r#"
            insert into pastes
                (id, code, language, stdin, stdout, stderr, compile_log, status,
                 execution_time_ms, memory_usage_kb, backend, created_at, updated_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(paste.id)
        .bind(&paste.code)
        .bind(&paste.language)
        .bind(&paste.stdin)
        .bind(&paste.stdout)
        .bind(&paste.stderr)
        .bind(&paste.compile_log)
        .bind(paste.status.as_str())
        .bind(paste.execution_time_ms)
        .bind(paste.memory_usage_kb)
        .bind(&paste.backend)
        .bind(paste.created_at)
        .bind(paste.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Validation(format!("paste {} already exists", paste.id))
            }
            _ => Error::backend(anyhow::Error::new(e).context("paste insert failed")),
        })?;

        Ok(())
    }

    async fn update(&self, paste: &Paste) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            update pastes
               set code = $2, language = $3, stdin = $4, stdout = $5, stderr = $6,
                   compile_log = $7, status = $8, execution_time_ms = $9,
                   memory_usage_kb = $10, backend = $11, updated_at = now()
             where id = $1
            "#,
        )
        .bind(paste.id)
        .bind(&paste.code)
        .bind(&paste.language)
        .bind(&paste.stdin)
        .bind(&paste.stdout)
        .bind(&paste.stderr)
        .bind(&paste.compile_log)
        .bind(paste.status.as_str())
        .bind(paste.execution_time_ms)
        .bind(paste.memory_usage_kb)
        .bind(&paste.backend)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::backend(anyhow::Error::new(e).context("paste update failed")))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Paste, Error> {
        let row = sqlx::query(
            r#"
            select id, code, language, stdin, stdout, stderr, compile_log, status,
                   execution_time_ms, memory_usage_kb, backend, created_at, updated_at
            from pastes
            where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::backend(anyhow::Error::new(e).context("paste fetch failed")))?;

        match row {
            Some(row) => {
                row_to_paste(row).map_err(|e| Error::backend(e.context("paste row decode failed")))
            }
            None => Err(Error::NotFound),
        }
    }
}

#[async_trait]
impl TaskQueue for PostgresStore {
    async fn enqueue(&self, paste_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            insert into queue (paste_id, enqueued_at)
            values ($1, now())
            "#,
        )
        .bind(paste_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::backend(anyhow::Error::new(e).context("queue enqueue failed")))?;

        Ok(())
    }

    /// Atomic claim: lock the oldest entry with `FOR UPDATE SKIP LOCKED` so
    /// concurrent dequeuers never contend for the same row, then delete it
    /// in the same statement so the claim and the removal commit together.
    async fn dequeue(&self) -> Result<Option<Paste>, Error> {
        let claimed: Option<(Uuid,)> = sqlx::query_as(
            r#"
            with to_claim as (
                select queue_id
                from queue
                order by enqueued_at asc
                limit 1
                for update skip locked
            )
            delete from queue
            where queue_id in (select queue_id from to_claim)
            returning paste_id
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::backend(anyhow::Error::new(e).context("queue dequeue failed")))?;

        let Some((paste_id,)) = claimed else {
            return Ok(None);
        };

        // Claim already committed; if the referenced row is gone the entry
        // is lost from the queue per the documented at-most-once tradeoff.
        self.get_by_id(paste_id).await.map(Some)
    }
}

impl Store for PostgresStore {}
