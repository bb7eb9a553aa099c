//! Canonical document and the per-surface buffers it is mirrored into.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two editing surfaces over one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceId {
    /// Structured WYSIWYG editor.
    Rich,
    /// Raw markdown source view.
    Raw,
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceId::Rich => f.write_str("rich"),
            SurfaceId::Raw => f.write_str("raw"),
        }
    }
}

impl std::str::FromStr for SurfaceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rich" => Ok(SurfaceId::Rich),
            "raw" => Ok(SurfaceId::Raw),
            other => Err(format!("unknown surface '{other}' (expected 'rich' or 'raw')")),
        }
    }
}

/// Propagation into a surface failed. Logged and swallowed: the canonical
/// write it followed has already landed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncApplyError {
    #[error("{0} surface is not mounted")]
    Unmounted(SurfaceId),
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical document
// ────────────────────────────────────────────────────────────────────────────

/// The single authoritative markdown text plus its revision counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    text: String,
    revision: u64,
}

impl CanonicalDocument {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            text: seed.into(),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the text, bumping the revision. Writing identical text is not
    /// a mutation and leaves the revision alone. Returns whether it changed.
    pub(crate) fn commit(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.revision += 1;
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Surface state
// ────────────────────────────────────────────────────────────────────────────

/// One surface's text buffer.
///
/// `dirty` means the buffer holds user edits not yet carried to the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceState {
    id: SurfaceId,
    text: String,
    dirty: bool,
    mounted: bool,
}

impl SurfaceState {
    pub fn unmounted(id: SurfaceId) -> Self {
        Self {
            id,
            text: String::new(),
            dirty: false,
            mounted: false,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Mounts the surface with a one-time copy of `seed`.
    pub(crate) fn mount(&mut self, seed: &str) {
        self.text = seed.to_string();
        self.dirty = false;
        self.mounted = true;
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.dirty = false;
    }

    pub(crate) fn apply_user_edit(&mut self, text: String) {
        self.text = text;
        self.dirty = true;
    }

    /// Programmatic write from the sync bridge. Never marks the buffer dirty.
    pub(crate) fn apply_propagated(&mut self, text: &str) -> Result<(), SyncApplyError> {
        if !self.mounted {
            return Err(SyncApplyError::Unmounted(self.id));
        }
        self.text = text.to_string();
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Everything the bridge reads and writes during a propagation.
#[derive(Debug, Clone)]
pub struct SyncState {
    pub document: CanonicalDocument,
    pub rich: SurfaceState,
    pub raw: SurfaceState,
}

impl SyncState {
    /// New session: Rich mounted with the seed, Raw closed.
    pub fn seeded(seed: &str) -> Self {
        let mut rich = SurfaceState::unmounted(SurfaceId::Rich);
        rich.mount(seed);
        Self {
            document: CanonicalDocument::new(seed),
            rich,
            raw: SurfaceState::unmounted(SurfaceId::Raw),
        }
    }

    pub fn surface(&self, id: SurfaceId) -> &SurfaceState {
        match id {
            SurfaceId::Rich => &self.rich,
            SurfaceId::Raw => &self.raw,
        }
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> &mut SurfaceState {
        match id {
            SurfaceId::Rich => &mut self.rich,
            SurfaceId::Raw => &mut self.raw,
        }
    }
}
