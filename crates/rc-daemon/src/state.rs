//! Shared runtime state for rc-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum; this module owns
//! nothing async itself beyond the store handle it is built with.

use std::sync::Arc;

use rc_db::Store;
use serde::Serialize;

/// Static build metadata included in the health response.
#[derive(Clone, Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            build: BuildInfo {
                service: "rc-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}
