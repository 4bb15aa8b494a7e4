use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::Error;

/// Terminal and in-flight lifecycle states of a [`Paste`].
///
/// Once a paste reaches any variant other than `Pending` or `Running` it is
/// terminal: the worker pool will not overwrite it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasteStatus {
    Pending,
    Running,
    Completed,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    UnknownError,
}

impl PasteStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PasteStatus::Pending | PasteStatus::Running)
    }

    /// Wire label used in the `status` column and in API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            PasteStatus::Pending => "pending",
            PasteStatus::Running => "running",
            PasteStatus::Completed => "completed",
            PasteStatus::CompileError => "compile error",
            PasteStatus::RuntimeError => "runtime error",
            PasteStatus::TimeLimitExceeded => "time limit exceeded",
            PasteStatus::MemoryLimitExceeded => "memory limit exceeded",
            PasteStatus::UnknownError => "unknown error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "pending" => PasteStatus::Pending,
            "running" => PasteStatus::Running,
            "completed" => PasteStatus::Completed,
            "compile error" => PasteStatus::CompileError,
            "runtime error" => PasteStatus::RuntimeError,
            "time limit exceeded" => PasteStatus::TimeLimitExceeded,
            "memory limit exceeded" => PasteStatus::MemoryLimitExceeded,
            "unknown error" => PasteStatus::UnknownError,
            _ => return None,
        })
    }
}

/// Recognized language tags. The registry in `rc-sandbox` dispatches on this.
pub const LANGUAGE_CPP20: &str = "c++20";

pub fn supported_languages() -> &'static [&'static str] {
    &[LANGUAGE_CPP20]
}

/// A sentinel used for metrics that could not be determined (usage-file
/// parse failure, or a status reached before the run phase started).
pub const METRIC_UNKNOWN: i64 = -1;

/// The persistent entity. Field order matches the `pastes` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paste {
    pub id: Uuid,
    pub code: String,
    pub language: String,
    pub stdin: String,
    pub stdout: String,
    pub stderr: String,
    pub compile_log: String,
    pub status: PasteStatus,
    pub execution_time_ms: i64,
    pub memory_usage_kb: i64,
    pub backend: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Paste {
    /// A brand-new paste in `pending` status, as produced by the submission
    /// adapter before it is ever touched by a worker.
    pub fn new(code: String, language: String, stdin: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            language,
            stdin,
            stdout: String::new(),
            stderr: String::new(),
            compile_log: String::new(),
            status: PasteStatus::Pending,
            execution_time_ms: METRIC_UNKNOWN,
            memory_usage_kb: METRIC_UNKNOWN,
            backend: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub run: bool,
    #[serde(default)]
    pub stdin: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
    pub paste_id: Uuid,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}
