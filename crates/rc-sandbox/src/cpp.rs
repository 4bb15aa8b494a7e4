//! The reference C++20 backend (spec §4.3 "C++20 backend algorithm").

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use rc_schemas::{Paste, PasteStatus, METRIC_UNKNOWN};

use crate::classify::classify_run_outcome;
use crate::engine::{ContainerEngine, ContainerSpec, PhaseOutcome};
use crate::limits::Limits;
use crate::usage::parse_usage;
use crate::workspace::Workspace;
use crate::SandboxRunner;

const COMPILE_TIMEOUT_LOG: &str = "Compile process exceeded time limit";

pub struct CppRunner {
    engine: Arc<dyn ContainerEngine>,
    limits: Limits,
}

impl CppRunner {
    pub fn new(engine: Arc<dyn ContainerEngine>, limits: Limits) -> Self {
        Self { engine, limits }
    }

    fn container_spec(&self, name: String, cmd: Vec<String>, workspace: &Workspace) -> ContainerSpec {
        ContainerSpec {
            name,
            image: self.limits.compiler_image.clone(),
            cmd,
            host_dir: workspace.path().to_path_buf(),
            memory_bytes: self.limits.memory_bytes(),
            cpu_quota_micros: self.limits.cpu_quota_micros(),
        }
    }

    /// Returns `true` if compilation succeeded and the run phase should
    /// proceed; `false` if `paste` was already left in a terminal state.
    async fn compile(&self, paste: &mut Paste, workspace: &Workspace) -> anyhow::Result<bool> {
        workspace
            .write_file("main.cpp", &paste.code)
            .context("write main.cpp")?;

        let spec = self.container_spec(
            format!("{}_builder", workspace.basename()),
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "g++ -std=c++20 /app/main.cpp -o /app/output > /app/compile.txt 2>&1".to_string(),
            ],
            workspace,
        );

        let handle = self
            .engine
            .launch(&spec)
            .await
            .context("launch compile container")?;
        let outcome = self.engine.wait(&handle, self.limits.deadline()).await;
        self.engine.remove(&handle).await;
        let outcome = outcome.context("wait for compile container")?;

        match outcome {
            PhaseOutcome::DeadlineExpired => {
                paste.status = PasteStatus::CompileError;
                paste.compile_log = COMPILE_TIMEOUT_LOG.to_string();
                Ok(false)
            }
            PhaseOutcome::Exited { exit_code, .. } => {
                paste.compile_log = workspace.read_file_or_empty("compile.txt");
                if exit_code != 0 {
                    paste.status = PasteStatus::CompileError;
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
        }
    }

    async fn run(&self, paste: &mut Paste, workspace: &Workspace) -> anyhow::Result<()> {
        workspace
            .write_file("input.txt", &paste.stdin)
            .context("write input.txt")?;

        let run_cmd = "/usr/bin/time -f '{\"exit_status\":%x,\"max_memory\":%M,\"real_time\":%e}' \
             -o /app/usage.json /app/output < /app/input.txt > /app/stdout.txt 2> /app/stderr.txt"
            .to_string();

        let spec = self.container_spec(
            format!("{}_runner", workspace.basename()),
            vec!["sh".to_string(), "-c".to_string(), run_cmd],
            workspace,
        );

        let handle = self
            .engine
            .launch(&spec)
            .await
            .context("launch run container")?;
        let outcome = self.engine.wait(&handle, self.limits.deadline()).await;
        self.engine.remove(&handle).await;
        let outcome = outcome.context("wait for run container")?;

        paste.stdout = workspace.read_file_or_empty("stdout.txt");
        paste.stderr = workspace.read_file_or_empty("stderr.txt");

        let (deadline_expired, exit_code, oom_killed) = match outcome {
            PhaseOutcome::DeadlineExpired => (true, 0, false),
            PhaseOutcome::Exited {
                exit_code,
                oom_killed,
            } => (false, exit_code, oom_killed),
        };

        paste.status = classify_run_outcome(deadline_expired, exit_code, oom_killed);

        match workspace
            .read_file_bytes("usage.json")
            .and_then(|bytes| parse_usage(&bytes))
        {
            Some((memory_usage_kb, execution_time_ms)) => {
                paste.memory_usage_kb = memory_usage_kb;
                paste.execution_time_ms = execution_time_ms;
            }
            None => {
                paste.memory_usage_kb = METRIC_UNKNOWN;
                paste.execution_time_ms = METRIC_UNKNOWN;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl SandboxRunner for CppRunner {
    async fn judge(&self, paste: &mut Paste) -> anyhow::Result<()> {
        let workspace = Workspace::new().context("allocate sandbox workspace")?;

        if self.compile(paste, &workspace).await? {
            self.run(paste, &workspace).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunHandle;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted engine: returns a canned [`PhaseOutcome`] keyed by the
    /// container-name suffix (`_builder` / `_runner`), and optionally writes
    /// fixture files into the workspace at `launch` time to emulate what a
    /// real container would have produced.
    struct FakeEngine {
        builder_outcome: PhaseOutcome,
        runner_outcome: PhaseOutcome,
        /// filename -> contents, written into the host dir on every launch.
        fixture_files: HashMap<&'static str, &'static str>,
        removed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContainerEngine for FakeEngine {
        async fn launch(&self, spec: &ContainerSpec) -> anyhow::Result<RunHandle> {
            for (name, contents) in &self.fixture_files {
                let _ = std::fs::write(spec.host_dir.join(name), contents);
            }
            Ok(RunHandle {
                container_id: spec.name.clone(),
            })
        }

        async fn wait(&self, handle: &RunHandle, _deadline: Duration) -> anyhow::Result<PhaseOutcome> {
            if handle.container_id.ends_with("_builder") {
                Ok(self.builder_outcome)
            } else {
                Ok(self.runner_outcome)
            }
        }

        async fn remove(&self, handle: &RunHandle) {
            self.removed.lock().unwrap().push(handle.container_id.clone());
        }
    }

    fn limits() -> Limits {
        Limits {
            cpu: 1.0,
            memory_mib: 512,
            time_secs: 10.0,
            compiler_image: "gcc:14".to_string(),
        }
    }

    fn paste() -> Paste {
        Paste::new("int main(){}".to_string(), "c++20".to_string(), String::new())
    }

    #[tokio::test]
    async fn compile_failure_sets_compile_error_and_skips_run() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::Exited {
                exit_code: 1,
                oom_killed: false,
            },
            runner_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            fixture_files: HashMap::from([("compile.txt", "main.cpp:1:1: error: expected ';'")]),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine.clone(), limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::CompileError);
        assert!(p.compile_log.contains("error"));
        assert_eq!(p.stdout, "");
        assert_eq!(engine.removed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn compile_deadline_sets_fixed_log_message() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::DeadlineExpired,
            runner_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            fixture_files: HashMap::new(),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine, limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::CompileError);
        assert_eq!(p.compile_log, COMPILE_TIMEOUT_LOG);
    }

    #[tokio::test]
    async fn happy_path_reaches_completed_with_metrics() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            runner_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            fixture_files: HashMap::from([
                ("stdout.txt", "5"),
                ("stderr.txt", ""),
                ("usage.json", r#"{"exit_status":0,"max_memory":2048,"real_time":0.05}"#),
            ]),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine.clone(), limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::Completed);
        assert_eq!(p.stdout, "5");
        assert_eq!(p.memory_usage_kb, 2048);
        assert_eq!(p.execution_time_ms, 50);
        assert_eq!(engine.removed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn run_deadline_sets_time_limit_exceeded() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            runner_outcome: PhaseOutcome::DeadlineExpired,
            fixture_files: HashMap::new(),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine, limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::TimeLimitExceeded);
        assert_eq!(p.memory_usage_kb, METRIC_UNKNOWN);
        assert_eq!(p.execution_time_ms, METRIC_UNKNOWN);
    }

    #[tokio::test]
    async fn oom_run_sets_memory_limit_exceeded() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            runner_outcome: PhaseOutcome::Exited {
                exit_code: 137,
                oom_killed: true,
            },
            fixture_files: HashMap::new(),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine, limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::MemoryLimitExceeded);
    }

    #[tokio::test]
    async fn nonzero_run_exit_sets_runtime_error_with_empty_stdout() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            runner_outcome: PhaseOutcome::Exited {
                exit_code: 42,
                oom_killed: false,
            },
            fixture_files: HashMap::new(),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine, limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::RuntimeError);
        assert_eq!(p.stdout, "");
    }

    #[tokio::test]
    async fn malformed_usage_file_yields_unknown_metrics() {
        let engine = Arc::new(FakeEngine {
            builder_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            runner_outcome: PhaseOutcome::Exited {
                exit_code: 0,
                oom_killed: false,
            },
            fixture_files: HashMap::from([("usage.json", "not json")]),
            removed: Mutex::new(Vec::new()),
        });
        let runner = CppRunner::new(engine, limits());
        let mut p = paste();

        runner.judge(&mut p).await.unwrap();

        assert_eq!(p.status, PasteStatus::Completed);
        assert_eq!(p.memory_usage_kb, METRIC_UNKNOWN);
        assert_eq!(p.execution_time_ms, METRIC_UNKNOWN);
    }
}
