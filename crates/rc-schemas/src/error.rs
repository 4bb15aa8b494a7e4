use thiserror::Error;

/// Typed error taxonomy shared between the HTTP adapter and the worker pool.
///
/// This is the one place in the workspace that fronts `anyhow` with a typed
/// enum: both callers need to match on variant (adapter picks an HTTP status,
/// worker picks a terminal [`crate::PasteStatus`]), so a string-typed
/// `anyhow::Error` would force stringly-typed matching at the seam.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("paste not found")]
    NotFound,

    #[error("backend error: {0}")]
    Backend(#[source] anyhow::Error),

    #[error("sandbox runner transient failure: {0}")]
    RunnerTransient(#[source] anyhow::Error),

    #[error("{phase} exceeded time limit")]
    RunnerDeadline { phase: &'static str },

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

impl Error {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Error::Backend(err.into())
    }

    pub fn runner_transient(err: impl Into<anyhow::Error>) -> Self {
        Error::RunnerTransient(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
