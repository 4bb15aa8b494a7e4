//! Shared test fixtures for scenario tests across the workspace.
//!
//! Kept deliberately small: a builder for a minimal valid [`Paste`], and an
//! in-process Axum router constructor so HTTP-level scenario tests don't
//! each have to know how `rc-daemon::state::AppState` is assembled.

use std::sync::Arc;

use rc_db::{MemoryStore, Store};
use rc_schemas::{Paste, LANGUAGE_CPP20};

/// A minimal valid, never-yet-saved paste in `pending` status.
pub fn sample_paste() -> Paste {
    Paste::new("int main(){}".to_string(), LANGUAGE_CPP20.to_string(), String::new())
}

/// Same as [`sample_paste`] but with the given code and stdin, for tests
/// that care about the compile/run outcome.
pub fn paste_with(code: &str, stdin: &str) -> Paste {
    Paste::new(code.to_string(), LANGUAGE_CPP20.to_string(), stdin.to_string())
}

/// Build an in-process `rc-daemon` router over a fresh in-memory store, for
/// request-level tests driven via `tower::ServiceExt::oneshot`.
pub fn daemon_router_with_memory_store() -> axum::Router {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    daemon_router(store)
}

/// Build an in-process `rc-daemon` router over the given store.
pub fn daemon_router(store: Arc<dyn Store>) -> axum::Router {
    let state = Arc::new(rc_daemon::state::AppState::new(store));
    rc_daemon::routes::build_router(state)
}
