//! Axum route handlers for editing sessions.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::PaginationEngine;
use crate::state::AppState;
use crate::sync::bridge::Direction;
use crate::sync::controller::EditOutcome;
use crate::sync::document::SurfaceId;
use crate::sync::session::{EditorSession, SessionExport, SessionSnapshot};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/v1/sessions`. An empty body means "no seed".
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Seed markdown from the persistence or OCR collaborator.
    pub markdown: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub surface: SurfaceId,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub accepted: bool,
    pub direction: Option<Direction>,
    /// Milliseconds until the scheduled propagation runs.
    pub due_in_ms: Option<u64>,
    pub revision: u64,
}

#[derive(Debug, Serialize)]
pub struct ClosedSessionResponse {
    pub id: Uuid,
    pub canonical: String,
    pub revision: u64,
}

fn parse_surface(raw: &str) -> Result<SurfaceId, AppError> {
    raw.parse().map_err(AppError::Validation)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice::<CreateSessionRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid session request: {e}")))?
    };

    let session = EditorSession::new(req.markdown.as_deref(), state.sync);
    let snapshot = session.snapshot();
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let sessions = state.sessions.lock().await;
    let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(session.snapshot()))
}

/// DELETE /api/v1/sessions/:id
///
/// Flushes pending edits and hands back the final canonical text for saving.
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClosedSessionResponse>, AppError> {
    let mut session = state.sessions.remove(id).await.ok_or_else(|| not_found(id))?;
    session.close_surface(SurfaceId::Raw);
    session.close_surface(SurfaceId::Rich);
    tracing::info!(session = %id, revision = session.revision(), "Editing session closed");
    Ok(Json(ClosedSessionResponse {
        id,
        canonical: session.canonical_text().to_string(),
        revision: session.revision(),
    }))
}

/// POST /api/v1/sessions/:id/surfaces/:surface/open
pub async fn handle_open_surface(
    State(state): State<AppState>,
    Path((id, surface)): Path<(Uuid, String)>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let surface = parse_surface(&surface)?;
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    session.open_surface(surface);
    Ok(Json(session.snapshot()))
}

/// POST /api/v1/sessions/:id/surfaces/:surface/close
pub async fn handle_close_surface(
    State(state): State<AppState>,
    Path((id, surface)): Path<(Uuid, String)>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let surface = parse_surface(&surface)?;
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    session.close_surface(surface);
    Ok(Json(session.snapshot()))
}

/// POST /api/v1/sessions/:id/edits
///
/// Records a user keystroke batch. Propagation happens on the sync pump.
pub async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    let outcome = session.user_edit(req.surface, req.text)?;

    let (accepted, direction, due_in_ms) = match outcome {
        EditOutcome::Scheduled { direction, due } => (
            true,
            Some(direction),
            Some(due.saturating_duration_since(Instant::now()).as_millis() as u64),
        ),
        EditOutcome::Ignored => (false, None, None),
    };

    Ok(Json(EditResponse {
        accepted,
        direction,
        due_in_ms,
        revision: session.revision(),
    }))
}

/// POST /api/v1/sessions/:id/export
pub async fn handle_export_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionExport>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    let export = session.export(&PaginationEngine::default(), Utc::now())?;
    Ok(Json(export))
}
