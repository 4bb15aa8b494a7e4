//! The Worker Pool: `cfg.process` cooperative consumers dequeuing tasks,
//! dispatching them to the Sandbox Runner, and persisting results.

use std::sync::Arc;
use std::time::Duration;

use rc_db::{with_deadline, PasteStore, Store, TaskQueue};
use rc_sandbox::{ContainerEngine, CppRunner, DockerEngine, LanguageRegistry, SandboxRunner};
use rc_schemas::{Paste, PasteStatus, LANGUAGE_CPP20};
use tokio_util::sync::CancellationToken;

/// Cadence at which an idle consumer re-polls the queue (spec §4.4: "≈1 Hz
/// when idle").
const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct PoolConfig {
    pub process: u32,
    pub backend_name: String,
    pub limits: rc_sandbox::Limits,
}

/// Spawn `cfg.process` consumers and block until `shutdown` is cancelled and
/// every consumer has observed it.
///
/// Fails fast if `store` does not support the queue surface (the in-memory
/// backend) — a worker pool configured against it is a startup-time
/// misconfiguration, not a per-call failure (spec §4.2, §10).
pub async fn run(
    store: Arc<dyn Store>,
    cfg: PoolConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        store.supports_queue(),
        "configured paste store does not support queue operations; the worker cannot start against it"
    );

    let mut handles = Vec::with_capacity(cfg.process as usize);
    for consumer_id in 0..cfg.process {
        let store = store.clone();
        let backend_name = cfg.backend_name.clone();
        let limits = cfg.limits.clone();
        let shutdown = shutdown.clone();

        handles.push(tokio::spawn(async move {
            if let Err(err) = consumer_loop(consumer_id, store, backend_name, limits, shutdown).await {
                tracing::error!(consumer_id, error = %err, "consumer loop exited with an error");
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}

/// One cooperative consumer: owns a single container-engine client and
/// language registry for its entire lifetime (spec §4.4: "creates and
/// reuses one container-engine client per consumer, not per task").
async fn consumer_loop(
    consumer_id: u32,
    store: Arc<dyn Store>,
    backend_name: String,
    limits: rc_sandbox::Limits,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let engine: Arc<dyn ContainerEngine> = Arc::new(DockerEngine::connect()?);
    let mut registry = LanguageRegistry::new();
    registry.register(
        LANGUAGE_CPP20,
        Arc::new(CppRunner::new(engine, limits)) as Arc<dyn SandboxRunner>,
    );

    tracing::info!(consumer_id, "worker consumer started");

    loop {
        if shutdown.is_cancelled() {
            break;
        }

        match with_deadline(store.dequeue()).await {
            Ok(Some(mut paste)) => {
                judge_one(store.as_ref(), &registry, &backend_name, &mut paste).await;
                // Immediate re-poll: don't wait out the idle cadence after a
                // task was obtained (spec §4.4 step 1).
                continue;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(consumer_id, error = %err, "dequeue failed");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(IDLE_POLL_INTERVAL) => {}
        }
    }

    tracing::info!(consumer_id, "worker consumer shut down");
    Ok(())
}

/// Drive one dequeued paste from `running` to a terminal status and persist
/// it. Never propagates an error: every recoverable condition becomes a
/// terminal status plus `compile_log`, per spec §7.
pub async fn judge_one(
    store: &dyn Store,
    registry: &LanguageRegistry,
    backend_name: &str,
    paste: &mut Paste,
) {
    paste.status = PasteStatus::Running;
    paste.backend = backend_name.to_string();
    if let Err(err) = with_deadline(store.update(paste)).await {
        tracing::warn!(paste_id = %paste.id, error = %err, "failed to mark paste running (best-effort)");
    }

    match registry.get(&paste.language) {
        Some(runner) => {
            if let Err(err) = runner.judge(paste).await {
                paste.status = PasteStatus::UnknownError;
                paste.compile_log = err.to_string();
            }
        }
        None => {
            paste.status = PasteStatus::UnknownError;
            paste.compile_log = format!("Unsupported language '{}'", paste.language);
        }
    }

    match with_deadline(store.update(paste)).await {
        Ok(()) => {
            tracing::info!(
                paste_id = %paste.id,
                language = %paste.language,
                status = paste.status.as_str(),
                execution_time_ms = paste.execution_time_ms,
                memory_usage_kb = paste.memory_usage_kb,
                "judged task"
            );
        }
        Err(err) => {
            tracing::warn!(paste_id = %paste.id, error = %err, "failed to persist terminal status (best-effort)");
        }
    }
}
