//! rc-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, builds the shared
//! state, wires middleware, and starts the HTTP server. All route handlers
//! live in `routes.rs`; all shared state types live in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::Method;
use rc_config::ApiConfig;
use rc_daemon::{routes, state};
use rc_db::{MemoryStore, PostgresStore, Store};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dev convenience; silent if absent, production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let config_path = std::env::var("RC_API_CONFIG").ok().map(std::path::PathBuf::from);
    let cfg = ApiConfig::load(config_path.as_deref()).context("load api config")?;

    let store: Arc<dyn Store> = match cfg.storage.kind.as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        "database" => {
            let pool = rc_db::connect(&cfg.storage.database.dsn)
                .await
                .context("connect to paste store")?;
            rc_db::migrate(&pool).await.context("run migrations")?;
            Arc::new(PostgresStore::new(pool))
        }
        other => anyhow::bail!("unsupported storage.type '{other}'"),
    };

    let shared = Arc::new(state::AppState::new(store));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(permissive_cors());

    let addr = bind_addr(cfg.app.port);
    info!("rc-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr(port: u16) -> SocketAddr {
    std::env::var("RC_DAEMON_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], port)))
}

/// Request/response validation and multi-tenant auth are out of the core's
/// concern; CORS stays permissive-by-default rather than hardcoded to a
/// fixed set of frontend origins.
fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
        .max_age(std::time::Duration::from_secs(3600))
}
