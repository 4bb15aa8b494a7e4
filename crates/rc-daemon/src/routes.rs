//! Axum router and all HTTP handlers for rc-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rc_db::{PasteStore, TaskQueue};
use rc_schemas::{Error, HealthResponse, LanguagesResponse, Paste, SubmitRequest, SubmitResponse};
use tracing::{error, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/api/pastes", post(submit_paste))
        .route("/api/pastes/:id", get(get_paste))
        .route("/api/languages", get(languages))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /api/pastes
// ---------------------------------------------------------------------------

pub(crate) async fn submit_paste(
    State(st): State<Arc<AppState>>,
    body: Result<Json<SubmitRequest>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("malformed request body: {rejection}"),
            )
        }
    };

    if req.code.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "code must not be empty".into());
    }
    if req.language.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "language must not be empty".into());
    }

    let paste = Paste::new(req.code, req.language, req.stdin);
    let paste_id = paste.id;

    if let Err(err) = rc_db::with_deadline(st.store.save(&paste)).await {
        return error_for(err);
    }

    if req.run {
        let store = st.store.clone();
        tokio::spawn(async move {
            if let Err(err) = rc_db::with_deadline(store.enqueue(paste_id)).await {
                warn!(paste_id = %paste_id, error = %err, "failed to enqueue paste after save");
            }
        });
    }

    (
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            message: "Created",
            paste_id,
            url: format!("/api/pastes/{paste_id}"),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /api/pastes/:id
// ---------------------------------------------------------------------------

pub(crate) async fn get_paste(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match rc_db::with_deadline(st.store.get_by_id(id)).await {
        Ok(paste) => Json(paste).into_response(),
        Err(err) => error_for(err),
    }
}

// ---------------------------------------------------------------------------
// GET /api/languages
// ---------------------------------------------------------------------------

pub(crate) async fn languages() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(LanguagesResponse {
            languages: rc_schemas::supported_languages(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn error_for(err: Error) -> Response {
    match err {
        Error::Validation(msg) => error_response(StatusCode::BAD_REQUEST, msg),
        Error::NotFound => error_response(StatusCode::NOT_FOUND, "Paste not found".into()),
        Error::Backend(e) => {
            error!(error = %e, "store backend failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
        }
        other => {
            error!(error = %other, "unexpected error at HTTP boundary");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}
