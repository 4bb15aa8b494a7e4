//! The Sandbox Runner: per-language strategies that judge a [`Paste`] by
//! driving an external container engine through a two-phase compile/run
//! pipeline.
//!
//! `rc-worker` holds a [`LanguageRegistry`] built once at startup and looks
//! up a runner by `paste.language` for each dequeued task.

pub mod classify;
pub mod cpp;
pub mod engine;
pub mod limits;
pub mod registry;
pub mod usage;
pub mod workspace;

pub use classify::classify_run_outcome;
pub use cpp::CppRunner;
pub use engine::{ContainerEngine, ContainerSpec, DockerEngine, PhaseOutcome, RunHandle};
pub use limits::Limits;
pub use registry::LanguageRegistry;

use async_trait::async_trait;
use rc_schemas::Paste;

/// A per-language judging strategy. Mutates `paste` in place, leaving it in
/// exactly one terminal state (per the state machine in spec §4.3).
///
/// Errors returned here are never terminal-status assignments themselves —
/// the caller (`rc-worker`) maps an `Err` to `unknown_error` with
/// `compile_log` set to the error's display text, matching the
/// `RunnerTransient` taxonomy entry.
#[async_trait]
pub trait SandboxRunner: Send + Sync {
    async fn judge(&self, paste: &mut Paste) -> anyhow::Result<()>;
}
