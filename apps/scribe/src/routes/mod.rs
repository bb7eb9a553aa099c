pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::layout::handlers::handle_export;
use crate::state::AppState;
use crate::sync::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless export
        .route("/api/v1/export", post(handle_export))
        // Editing sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_close_session),
        )
        .route("/api/v1/sessions/:id/edits", post(handlers::handle_edit))
        .route(
            "/api/v1/sessions/:id/export",
            post(handlers::handle_export_session),
        )
        .route(
            "/api/v1/sessions/:id/surfaces/:surface/open",
            post(handlers::handle_open_surface),
        )
        .route(
            "/api/v1/sessions/:id/surfaces/:surface/close",
            post(handlers::handle_close_surface),
        )
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
