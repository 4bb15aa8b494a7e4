//! Resource limits a [`crate::SandboxRunner`] enforces while judging a paste.
//!
//! Deliberately decoupled from `rc-config::WorkerConfig` so this crate never
//! depends on the config loader; `rc-worker` is responsible for translating
//! one into the other at startup.

/// CPU/memory/time caps plus the compiler image tag, mirroring the
/// `limit.*` and `compiler_image` keys of `WorkerConfig`.
#[derive(Debug, Clone)]
pub struct Limits {
    pub cpu: f64,
    pub memory_mib: i64,
    pub time_secs: f64,
    pub compiler_image: String,
}

impl Limits {
    pub fn memory_bytes(&self) -> i64 {
        self.memory_mib * 1024 * 1024
    }

    /// `cfg.limit.cpu × 100000` microseconds per 100ms period.
    pub fn cpu_quota_micros(&self) -> i64 {
        (self.cpu * 100_000.0).round() as i64
    }

    pub fn deadline(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.time_secs.max(0.0))
    }
}
