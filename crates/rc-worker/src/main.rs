//! `rc-worker` entry point.
//!
//! Loads `WorkerConfig`, connects the Paste Store / Task Queue backend, and
//! runs the worker pool until `SIGINT`/`SIGTERM`. Thin by design: all the
//! judging logic lives in `rc-sandbox`; the consumer loop lives in
//! `rc_worker::pool`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use rc_config::WorkerConfig;
use rc_db::{PostgresStore, Store};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dev convenience; silent if absent, same as rc-daemon.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let config_path = std::env::var("RC_WORKER_CONFIG").ok().map(PathBuf::from);
    let cfg = WorkerConfig::load(config_path.as_deref()).context("load worker config")?;

    let store: Arc<dyn Store> = match cfg.storage.kind.as_str() {
        "memory" => {
            anyhow::bail!(
                "worker cannot be configured with storage.type=memory: \
                 the in-memory store does not support queue operations"
            );
        }
        "database" => {
            let pool = rc_db::connect(&cfg.storage.database.dsn)
                .await
                .context("connect to paste store")?;
            rc_db::migrate(&pool).await.context("run migrations")?;
            Arc::new(PostgresStore::new(pool))
        }
        other => anyhow::bail!("unsupported storage.type '{other}'"),
    };

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal, draining in-flight tasks");
            shutdown_signal.cancel();
        }
    });

    let pool_cfg = rc_worker::PoolConfig {
        process: cfg.process,
        backend_name: cfg.name.clone(),
        limits: rc_worker::limits_from_config(&cfg),
    };

    info!(
        process = cfg.process,
        name = %cfg.name,
        compiler_image = %cfg.compiler_image,
        "rc-worker starting"
    );

    rc_worker::run(store, pool_cfg, shutdown).await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
