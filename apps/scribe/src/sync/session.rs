//! An editing session: one canonical document, its two surfaces, and export.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::layout::{ExportError, ExportedDocument, PaginationEngine};
use crate::sync::bridge::{Direction, SyncConfig};
use crate::sync::controller::{
    AuthorityMode, EditOrigin, EditOutcome, SourceOfTruthController, SyncError,
};
use crate::sync::document::{SurfaceId, SurfaceState};

/// Seed used when a session is opened without a document.
pub const WELCOME_NOTE: &str = "# Welcome to Scribe\nReady for your handwritten notes!";

/// Export result tagged with the canonical revision it was produced from.
#[derive(Debug, Clone, Serialize)]
pub struct SessionExport {
    pub revision: u64,
    #[serde(flatten)]
    pub document: ExportedDocument,
}

/// Read-only view of a session for the persistence collaborator and clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub canonical: String,
    pub revision: u64,
    pub mode: AuthorityMode,
    pub rich: SurfaceState,
    pub raw: SurfaceState,
    pub pending: Vec<Direction>,
    pub created_at: DateTime<Utc>,
}

pub struct EditorSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    /// Last open, close, edit or export.
    last_touched: Instant,
    controller: SourceOfTruthController,
}

impl EditorSession {
    pub fn new(seed: Option<&str>, config: SyncConfig) -> Self {
        let id = Uuid::new_v4();
        let seed = seed.unwrap_or(WELCOME_NOTE);
        info!(session = %id, bytes = seed.len(), "Editing session opened");
        Self {
            id,
            created_at: Utc::now(),
            last_touched: Instant::now(),
            controller: SourceOfTruthController::new(seed, config),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn controller(&self) -> &SourceOfTruthController {
        &self.controller
    }

    pub fn canonical_text(&self) -> &str {
        self.controller.state().document.text()
    }

    pub fn revision(&self) -> u64 {
        self.controller.state().document.revision()
    }

    /// How long the session has gone without a client interaction.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }

    pub fn open_surface(&mut self, surface: SurfaceId) {
        self.last_touched = Instant::now();
        self.controller.on_surface_opened(surface);
    }

    pub fn close_surface(&mut self, surface: SurfaceId) {
        self.last_touched = Instant::now();
        self.controller.on_surface_closed(surface);
    }

    /// Records a user edit at the current instant.
    pub fn user_edit(
        &mut self,
        surface: SurfaceId,
        text: String,
    ) -> Result<EditOutcome, SyncError> {
        let now = Instant::now();
        self.last_touched = now;
        self.controller.on_edit(surface, text, EditOrigin::User, now)
    }

    /// Commits whatever is still pending, ahead of the session being dropped.
    pub fn flush(&mut self) {
        self.controller.flush_all();
    }

    pub fn fire_due(&mut self, now: Instant) -> usize {
        self.controller.fire_due(now)
    }

    /// Sleeps through every pending debounce window until nothing is scheduled.
    pub async fn settle(&mut self) {
        while let Some(deadline) = self.controller.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            self.controller.fire_due(Instant::now());
        }
    }

    /// Flushes pending propagations, then paginates the canonical document.
    pub fn export(
        &mut self,
        engine: &PaginationEngine,
        at: DateTime<Utc>,
    ) -> Result<SessionExport, ExportError> {
        self.last_touched = Instant::now();
        self.controller.flush_all();
        let revision = self.revision();
        let document = engine.export(self.canonical_text(), at)?;
        info!(session = %self.id, revision, pages = document.pages.len(), "Session exported");
        Ok(SessionExport { revision, document })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.controller.state();
        SessionSnapshot {
            id: self.id,
            canonical: state.document.text().to_string(),
            revision: state.document.revision(),
            mode: self.controller.mode(),
            rich: state.rich.clone(),
            raw: state.raw.clone(),
            pending: self.controller.bridge().pending_directions(),
            created_at: self.created_at,
        }
    }
}
