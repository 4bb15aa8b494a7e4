//! The Worker Pool library target, exposed so `rc-testkit` and scenario
//! tests can drive it without going through the `rc-worker` binary.

pub mod pool;

pub use pool::{judge_one, run, PoolConfig};

/// Translate the on-disk `WorkerConfig` into the `rc-sandbox::Limits` the
/// runner strategies consume. Kept as a free function rather than a
/// `From` impl so `rc-sandbox` never needs to depend on `rc-config`.
pub fn limits_from_config(cfg: &rc_config::WorkerConfig) -> rc_sandbox::Limits {
    rc_sandbox::Limits {
        cpu: cfg.limit.cpu,
        memory_mib: cfg.limit.memory,
        time_secs: cfg.limit.time,
        compiler_image: cfg.compiler_image.clone(),
    }
}
