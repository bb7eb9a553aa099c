//! SourceOfTruthController — which surface may write, and when authority moves.
//!
//! Rich is authoritative until Raw is opened. Opening Raw seeds it once with
//! the canonical text; closing Raw flushes its edits into the canonical
//! document and force-pushes them into Rich before authority returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::sync::bridge::{Direction, SyncBridge, SyncConfig};
use crate::sync::document::{SurfaceId, SyncState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityMode {
    RichAuthoritative,
    RawAuthoritative,
}

impl AuthorityMode {
    pub fn authoritative_surface(self) -> SurfaceId {
        match self {
            AuthorityMode::RichAuthoritative => SurfaceId::Rich,
            AuthorityMode::RawAuthoritative => SurfaceId::Raw,
        }
    }
}

/// Where an edit came from. Only user edits are ever scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOrigin {
    User,
    Programmatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Scheduled { direction: Direction, due: Instant },
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{surface} surface is not authoritative while {mode:?}")]
    NotAuthoritative {
        surface: SurfaceId,
        mode: AuthorityMode,
    },

    #[error("{0} surface is not open")]
    SurfaceNotOpen(SurfaceId),
}

pub struct SourceOfTruthController {
    mode: AuthorityMode,
    bridge: SyncBridge,
    state: SyncState,
    config: SyncConfig,
}

impl SourceOfTruthController {
    pub fn new(seed: &str, config: SyncConfig) -> Self {
        Self {
            mode: AuthorityMode::RichAuthoritative,
            bridge: SyncBridge::new(),
            state: SyncState::seeded(seed),
            config,
        }
    }

    pub fn mode(&self) -> AuthorityMode {
        self.mode
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn bridge(&self) -> &SyncBridge {
        &self.bridge
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.bridge.next_deadline()
    }

    /// Mounts a surface. Opening Raw makes it authoritative.
    pub fn on_surface_opened(&mut self, surface: SurfaceId) {
        match surface {
            SurfaceId::Raw if self.mode == AuthorityMode::RawAuthoritative => {
                debug!("Raw surface already open");
            }
            SurfaceId::Raw => {
                // Land the last Rich keystrokes before Raw copies the canonical text.
                self.bridge
                    .flush_now(Direction::RichToCanonical, &mut self.state, self.mode);
                self.mode = AuthorityMode::RawAuthoritative;
                let seed = self.state.document.text().to_string();
                self.state.raw.mount(&seed);
                info!(
                    revision = self.state.document.revision(),
                    "Raw surface opened; raw is authoritative"
                );
            }
            SurfaceId::Rich if self.state.rich.is_mounted() => {
                debug!("Rich surface already mounted");
            }
            SurfaceId::Rich => {
                let seed = self.state.document.text().to_string();
                self.state.rich.mount(&seed);
                info!("Rich surface mounted");
            }
        }
    }

    /// Unmounts a surface. Closing Raw hands authority back to Rich.
    pub fn on_surface_closed(&mut self, surface: SurfaceId) {
        match surface {
            SurfaceId::Raw if self.mode == AuthorityMode::RichAuthoritative => {
                debug!("Raw surface already closed");
            }
            SurfaceId::Raw => {
                // Flush and force the push while Raw still holds authority.
                let text = self
                    .bridge
                    .cancel_pending(Direction::RawToRich)
                    .map(|pending| pending.text)
                    .unwrap_or_else(|| self.state.raw.text().to_string());
                self.bridge
                    .propagate(Direction::RawToRich, &text, &mut self.state, self.mode);
                self.state.raw.unmount();
                self.mode = AuthorityMode::RichAuthoritative;
                info!(
                    revision = self.state.document.revision(),
                    "Raw surface closed; rich is authoritative"
                );
            }
            SurfaceId::Rich => {
                self.bridge
                    .flush_now(Direction::RichToCanonical, &mut self.state, self.mode);
                self.state.rich.unmount();
                info!("Rich surface unmounted");
            }
        }
    }

    /// Accepts a user edit from the authoritative surface and schedules its
    /// propagation. Never touches the other surface synchronously.
    pub fn on_edit(
        &mut self,
        surface: SurfaceId,
        text: String,
        origin: EditOrigin,
        now: Instant,
    ) -> Result<EditOutcome, SyncError> {
        if origin == EditOrigin::Programmatic {
            trace!(%surface, "Programmatic write ignored");
            return Ok(EditOutcome::Ignored);
        }
        if self.mode.authoritative_surface() != surface {
            return Err(SyncError::NotAuthoritative {
                surface,
                mode: self.mode,
            });
        }
        if !self.state.surface(surface).is_mounted() {
            return Err(SyncError::SurfaceNotOpen(surface));
        }

        self.state.surface_mut(surface).apply_user_edit(text.clone());
        if surface == SurfaceId::Raw {
            self.bridge.commit(&mut self.state, &text);
        }

        let direction = Direction::from_source(surface);
        let delay = self.config.delay_for(direction);
        self.bridge.schedule_propagation(surface, text, delay, now);
        Ok(EditOutcome::Scheduled {
            direction,
            due: now + delay,
        })
    }

    pub fn fire_due(&mut self, now: Instant) -> usize {
        self.bridge.fire_due(now, &mut self.state, self.mode)
    }

    /// Runs every pending propagation immediately.
    pub fn flush_all(&mut self) {
        for direction in [Direction::RichToCanonical, Direction::RawToRich] {
            self.bridge.flush_now(direction, &mut self.state, self.mode);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
