//! Container-engine contract the sandbox runner drives, and its Docker
//! implementation via `bollard`.
//!
//! Split into a trait so `cpp.rs` can be exercised against a scripted fake
//! (see `tests/scenario_cpp_runner_classification.rs`) without a Docker
//! daemon, the same way `mqk-broker-paper` stands in for the live Alpaca
//! adapter behind `BrokerAdapter`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    CreateContainerOptions, RemoveContainerOptions, WaitContainerOptions,
};
use bollard::Docker;
use futures_util::StreamExt;

/// Everything needed to create one sandbox container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Must be unique per task/phase; derived from the workspace basename.
    pub name: String,
    pub image: String,
    pub cmd: Vec<String>,
    /// Host directory bind-mounted to `/app` inside the container.
    pub host_dir: PathBuf,
    pub memory_bytes: i64,
    pub cpu_quota_micros: i64,
}

/// A created-and-started container, opaque beyond its id.
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub container_id: String,
}

/// Outcome of racing container completion against a phase deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Exited { exit_code: i64, oom_killed: bool },
    DeadlineExpired,
}

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Create and start a container from `spec`.
    async fn launch(&self, spec: &ContainerSpec) -> anyhow::Result<RunHandle>;

    /// Block until the container stops running or `deadline` elapses,
    /// whichever comes first.
    async fn wait(&self, handle: &RunHandle, deadline: Duration) -> anyhow::Result<PhaseOutcome>;

    /// Force-remove the container. Best-effort: failures are logged by the
    /// caller, never surfaced as a task error.
    async fn remove(&self, handle: &RunHandle);
}

/// Docker Engine API client, one per worker consumer (see `rc-worker`).
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn launch(&self, spec: &ContainerSpec) -> anyhow::Result<RunHandle> {
        let config = bollard::container::Config {
            image: Some(spec.image.clone()),
            cmd: Some(spec.cmd.clone()),
            host_config: Some(bollard::service::HostConfig {
                binds: Some(vec![format!(
                    "{}:/app",
                    spec.host_dir.to_string_lossy()
                )]),
                memory: Some(spec.memory_bytes),
                cpu_quota: Some(spec.cpu_quota_micros),
                network_mode: Some("none".to_string()),
                auto_remove: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let container = self
            .docker
            .create_container(Some(create_options), config)
            .await?;

        self.docker
            .start_container::<String>(&container.id, None)
            .await?;

        Ok(RunHandle {
            container_id: container.id,
        })
    }

    async fn wait(&self, handle: &RunHandle, deadline: Duration) -> anyhow::Result<PhaseOutcome> {
        let mut stream = self.docker.wait_container(
            &handle.container_id,
            Some(WaitContainerOptions {
                condition: "not-running",
            }),
        );

        match tokio::time::timeout(deadline, stream.next()).await {
            Err(_) => Ok(PhaseOutcome::DeadlineExpired),
            Ok(_) => {
                let inspect = self
                    .docker
                    .inspect_container(&handle.container_id, None)
                    .await?;
                let state = inspect.state.unwrap_or_default();
                let exit_code = state.exit_code.unwrap_or(-1);
                let oom_killed = state.oom_killed.unwrap_or(false);
                Ok(PhaseOutcome::Exited {
                    exit_code,
                    oom_killed,
                })
            }
        }
    }

    async fn remove(&self, handle: &RunHandle) {
        if let Err(err) = self
            .docker
            .remove_container(
                &handle.container_id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            tracing::warn!(
                container_id = %handle.container_id,
                error = %err,
                "failed to remove sandbox container"
            );
        }
    }
}
