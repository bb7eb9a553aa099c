//! Axum route handler for stateless export.

use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::{ExportedDocument, PaginationEngine};

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub markdown: String,
}

/// POST /api/v1/export
///
/// Paginates a canonical markdown string without opening a session.
pub async fn handle_export(
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportedDocument>, AppError> {
    let document = PaginationEngine::default().export(&request.markdown, Utc::now())?;
    Ok(Json(document))
}
