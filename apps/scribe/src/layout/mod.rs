// Export engine: classify canonical markdown line by line, wrap and position
// each block, and cut the result into fixed A4 pages.
// Runs to completion synchronously; callers flush pending edits first.

pub mod classifier;
pub mod engine;
pub mod font_metrics;
pub mod handlers;
pub mod inline;
pub mod pagination;

// Re-export the public API consumed by the session and HTTP layers.
pub use pagination::{ExportError, ExportedDocument, PaginationEngine};
