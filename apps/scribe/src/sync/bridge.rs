//! SyncBridge — debounced, loop-safe propagation between the two surfaces.
//!
//! # Directions
//! - `RichToCanonical`: a Rich edit commits to the canonical document after
//!   the debounce window. Raw is closed while Rich is authoritative, so there
//!   is no surface to push into.
//! - `RawToRich`: a Raw edit commits to the canonical document immediately
//!   (per keystroke); the push into the Rich buffer is debounced.
//!
//! Timers are plain deadline values, one slot per direction. Scheduling into
//! an occupied slot replaces it, which is the debounce. Whoever owns the clock
//! calls `fire_due` once `next_deadline` has passed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::sync::controller::AuthorityMode;
use crate::sync::document::{SurfaceId, SyncState};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    RichToCanonical,
    RawToRich,
}

impl Direction {
    pub fn from_source(surface: SurfaceId) -> Self {
        match surface {
            SurfaceId::Rich => Direction::RichToCanonical,
            SurfaceId::Raw => Direction::RawToRich,
        }
    }

    pub fn source(self) -> SurfaceId {
        match self {
            Direction::RichToCanonical => SurfaceId::Rich,
            Direction::RawToRich => SurfaceId::Raw,
        }
    }

    /// Surface that receives the value after the canonical write, if any.
    pub fn target(self) -> Option<SurfaceId> {
        match self {
            Direction::RichToCanonical => None,
            Direction::RawToRich => Some(SurfaceId::Rich),
        }
    }

    /// Whether `mode` still lets this direction push into its target.
    pub fn valid_under(self, mode: AuthorityMode) -> bool {
        mode.authoritative_surface() == self.source()
    }
}

/// Debounce windows per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay before a Rich edit is committed to the canonical document.
    pub rich_commit_delay: Duration,
    /// Delay before a Raw edit is pushed into the Rich buffer.
    pub raw_push_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rich_commit_delay: DEFAULT_DEBOUNCE,
            raw_push_delay: DEFAULT_DEBOUNCE,
        }
    }
}

impl SyncConfig {
    pub fn delay_for(&self, direction: Direction) -> Duration {
        match direction {
            Direction::RichToCanonical => self.rich_commit_delay,
            Direction::RawToRich => self.raw_push_delay,
        }
    }
}

/// A scheduled propagation: the latest text and when it is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSync {
    pub text: String,
    pub due: Instant,
}

#[derive(Debug, Default)]
pub struct SyncBridge {
    rich_to_canonical: Option<PendingSync>,
    raw_to_rich: Option<PendingSync>,
}

impl SyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<PendingSync> {
        match direction {
            Direction::RichToCanonical => &mut self.rich_to_canonical,
            Direction::RawToRich => &mut self.raw_to_rich,
        }
    }

    pub fn pending(&self, direction: Direction) -> Option<&PendingSync> {
        match direction {
            Direction::RichToCanonical => self.rich_to_canonical.as_ref(),
            Direction::RawToRich => self.raw_to_rich.as_ref(),
        }
    }

    pub fn pending_directions(&self) -> Vec<Direction> {
        [Direction::RichToCanonical, Direction::RawToRich]
            .into_iter()
            .filter(|d| self.pending(*d).is_some())
            .collect()
    }

    /// Earliest deadline across both directions.
    pub fn next_deadline(&self) -> Option<Instant> {
        [&self.rich_to_canonical, &self.raw_to_rich]
            .into_iter()
            .flatten()
            .map(|p| p.due)
            .min()
    }

    /// Schedules `text` to propagate from `from` after `delay`, replacing any
    /// propagation already pending in that direction.
    pub fn schedule_propagation(
        &mut self,
        from: SurfaceId,
        text: String,
        delay: Duration,
        now: Instant,
    ) -> Direction {
        let direction = Direction::from_source(from);
        let due = now + delay;
        if self
            .slot_mut(direction)
            .replace(PendingSync { text, due })
            .is_some()
        {
            debug!(?direction, "Pending propagation superseded");
        }
        direction
    }

    pub fn cancel_pending(&mut self, direction: Direction) -> Option<PendingSync> {
        self.slot_mut(direction).take()
    }

    /// Runs the pending propagation for `direction` now, if there is one.
    pub fn flush_now(
        &mut self,
        direction: Direction,
        state: &mut SyncState,
        mode: AuthorityMode,
    ) -> bool {
        match self.cancel_pending(direction) {
            Some(pending) => {
                self.propagate(direction, &pending.text, state, mode);
                true
            }
            None => false,
        }
    }

    /// Runs every propagation whose deadline is at or before `now`.
    pub fn fire_due(&mut self, now: Instant, state: &mut SyncState, mode: AuthorityMode) -> usize {
        let mut fired = 0;
        for direction in [Direction::RichToCanonical, Direction::RawToRich] {
            let due = self.pending(direction).is_some_and(|p| p.due <= now);
            if due && self.flush_now(direction, state, mode) {
                fired += 1;
            }
        }
        fired
    }

    /// Immediate canonical write, outside any debounce window.
    pub fn commit(&self, state: &mut SyncState, text: &str) -> bool {
        let changed = state.document.commit(text);
        if changed {
            debug!(revision = state.document.revision(), "Canonical document committed");
        }
        changed
    }

    /// Canonical write followed by the push into the target surface.
    ///
    /// A failed push is logged and dropped; the canonical write stands.
    pub fn propagate(
        &self,
        direction: Direction,
        text: &str,
        state: &mut SyncState,
        mode: AuthorityMode,
    ) {
        self.commit(state, text);
        state.surface_mut(direction.source()).mark_clean();

        let Some(target) = direction.target() else {
            return;
        };
        if !direction.valid_under(mode) {
            debug!(?direction, ?mode, "Authority changed; push skipped");
            return;
        }
        if let Err(e) = state.surface_mut(target).apply_propagated(text) {
            warn!(error = %e, ?direction, "Propagation into surface failed");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
