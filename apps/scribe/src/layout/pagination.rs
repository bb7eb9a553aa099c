//! Pagination — drives classification and layout over a whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::layout::classifier::classify;
use crate::layout::engine::{Fragment, LayoutCursor, LayoutEvent, TextLayoutEngine};
use crate::layout::font_metrics::{PageGeometry, A4};

const EXPORT_EXTENSION: &str = "pdf";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("Document is empty; nothing to export")]
    EmptyDocument,
}

/// A finalized page. Fragments are in emission (top-to-bottom) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    index: usize,
    fragments: Vec<Fragment>,
}

impl Page {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

/// Terminal export output handed to the document-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedDocument {
    pub filename: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub exported_at: DateTime<Utc>,
}

pub struct PaginationEngine {
    layout: TextLayoutEngine,
}

impl Default for PaginationEngine {
    fn default() -> Self {
        Self::new(A4)
    }
}

impl PaginationEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            layout: TextLayoutEngine::new(geometry),
        }
    }

    /// Lays out `canonical_text` into pages.
    ///
    /// Fails with `EmptyDocument` when the trimmed text is empty.
    pub fn paginate(&self, canonical_text: &str) -> Result<Vec<Page>, ExportError> {
        if canonical_text.trim().is_empty() {
            return Err(ExportError::EmptyDocument);
        }

        let mut cursor = LayoutCursor::new(self.layout.geometry());
        let mut pages: Vec<Page> = Vec::new();
        let mut current: Vec<Fragment> = Vec::new();

        // `split('\n')` keeps interior empty lines; a trailing newline is not a line.
        let body = canonical_text.strip_suffix('\n').unwrap_or(canonical_text);
        for line in body.split('\n') {
            let block = classify(line.strip_suffix('\r').unwrap_or(line));
            for event in self.layout.layout(&block, &mut cursor) {
                match event {
                    LayoutEvent::Fragment(fragment) => current.push(fragment),
                    // A break over a page with nothing drawn (leading blank
                    // lines only) restarts the same page.
                    LayoutEvent::PageBreak if current.is_empty() => {}
                    LayoutEvent::PageBreak => {
                        pages.push(Page {
                            index: pages.len(),
                            fragments: std::mem::take(&mut current),
                        });
                    }
                }
            }
        }

        pages.push(Page {
            index: pages.len(),
            fragments: current,
        });
        Ok(pages)
    }

    /// Paginates and names the export after `at`.
    pub fn export(
        &self,
        canonical_text: &str,
        at: DateTime<Utc>,
    ) -> Result<ExportedDocument, ExportError> {
        let pages = self.paginate(canonical_text)?;
        let filename = export_filename(at);
        info!(pages = pages.len(), %filename, "Export paginated");
        Ok(ExportedDocument {
            filename,
            geometry: *self.layout.geometry(),
            pages,
            exported_at: at,
        })
    }
}

/// `export-<ISO date>.pdf` for the given timestamp.
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("export-{}.{EXPORT_EXTENSION}", at.format("%Y-%m-%d"))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
