//! Text layout — wraps one block at a time and positions its sub-lines.
//!
//! # Spacing rules
//! - every sub-line advances the cursor by one line height (7 units)
//! - after the whole block: +2 for Heading 1, +1 for Heading 2, nothing else
//! - a blank line advances half a line height and emits nothing
//!
//! The page-break check runs before each sub-line, not once per block, so a
//! long paragraph continues onto the next page mid-block.

use serde::{Deserialize, Serialize};

use crate::layout::classifier::{Block, BlockKind};
use crate::layout::font_metrics::{get_metrics, FontWeight, PageGeometry};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// One positioned line of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub weight: FontWeight,
    pub block: BlockKind,
}

/// Output of laying out a block, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// The current page is full; following fragments belong to a new page.
    PageBreak,
    Fragment(Fragment),
}

/// Running layout state for one export. Shared across every block.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCursor {
    pub y: f32,
    pub page: usize,
    pub font_size: f32,
    pub weight: FontWeight,
}

impl LayoutCursor {
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            y: geometry.margin,
            page: 0,
            font_size: BODY_SIZE,
            weight: FontWeight::Normal,
        }
    }
}

/// Font and spacing for one block kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    pub weight: FontWeight,
    /// Extra advance after the last sub-line of the block.
    pub spacing_after: f32,
}

const BODY_SIZE: f32 = 11.0;
const BULLET_PREFIX: &str = "• ";

pub fn block_style(kind: BlockKind) -> BlockStyle {
    let (font_size, weight, spacing_after) = match kind {
        BlockKind::Heading1 => (18.0, FontWeight::Bold, 2.0),
        BlockKind::Heading2 => (14.0, FontWeight::Bold, 1.0),
        BlockKind::Heading3 => (12.0, FontWeight::Bold, 0.0),
        BlockKind::BulletItem | BlockKind::Paragraph | BlockKind::BlankLine => {
            (BODY_SIZE, FontWeight::Normal, 0.0)
        }
    };
    BlockStyle {
        font_size,
        weight,
        spacing_after,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

pub struct TextLayoutEngine {
    geometry: PageGeometry,
}

impl TextLayoutEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Lays out one block against `cursor`, advancing it.
    pub fn layout(&self, block: &Block, cursor: &mut LayoutCursor) -> Vec<LayoutEvent> {
        let kind = block.kind();
        let style = block_style(kind);
        cursor.font_size = style.font_size;
        cursor.weight = style.weight;

        let (text, x, max_width) = match block {
            Block::BlankLine => {
                cursor.y += self.geometry.line_height / 2.0;
                return Vec::new();
            }
            Block::Heading { text, .. } | Block::Paragraph { text } => (
                text.clone(),
                self.geometry.margin,
                self.geometry.wrap_width(),
            ),
            Block::BulletItem { text } => (
                format!("{BULLET_PREFIX}{text}"),
                self.geometry.margin + self.geometry.bullet_indent,
                self.geometry.wrap_width() - self.geometry.bullet_indent,
            ),
        };

        let metrics = get_metrics(style.weight);
        let lines = metrics.wrap(&text, style.font_size, max_width);
        let mut events = Vec::with_capacity(lines.len());

        for line in lines {
            if cursor.y > self.geometry.bottom_bound() {
                cursor.page += 1;
                cursor.y = self.geometry.margin;
                events.push(LayoutEvent::PageBreak);
            }
            events.push(LayoutEvent::Fragment(Fragment {
                text: line,
                x,
                y: cursor.y,
                font_size: style.font_size,
                weight: style.weight,
                block: kind,
            }));
            cursor.y += self.geometry.line_height;
        }

        cursor.y += style.spacing_after;
        events
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::classifier::classify;
    use crate::layout::font_metrics::A4;

    fn fragments(events: &[LayoutEvent]) -> Vec<&Fragment> {
        events
            .iter()
            .filter_map(|e| match e {
                LayoutEvent::Fragment(f) => Some(f),
                LayoutEvent::PageBreak => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_one_style_and_spacing() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        let events = engine.layout(&classify("# Title"), &mut cursor);

        let frags = fragments(&events);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "Title");
        assert_eq!(frags[0].font_size, 18.0);
        assert_eq!(frags[0].weight, FontWeight::Bold);
        assert_eq!(frags[0].y, 20.0);
        assert_eq!(cursor.y, 20.0 + 7.0 + 2.0);
    }

    #[test]
    fn test_heading_two_and_three_spacing() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        engine.layout(&classify("## Sub"), &mut cursor);
        assert_eq!(cursor.y, 28.0);
        engine.layout(&classify("### Minor"), &mut cursor);
        assert_eq!(cursor.y, 35.0);
        assert_eq!(cursor.font_size, 12.0);
    }

    #[test]
    fn test_paragraph_has_no_trailing_spacing() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        engine.layout(&classify("Some text"), &mut cursor);
        assert_eq!(cursor.y, 27.0);
        assert_eq!(cursor.weight, FontWeight::Normal);
    }

    #[test]
    fn test_blank_line_advances_half_line() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        let events = engine.layout(&Block::BlankLine, &mut cursor);
        assert!(events.is_empty());
        assert_eq!(cursor.y, 23.5);
    }

    #[test]
    fn test_bullet_is_prefixed_and_indented() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        let events = engine.layout(&classify("- item one"), &mut cursor);
        let frags = fragments(&events);
        assert_eq!(frags[0].text, "• item one");
        assert_eq!(frags[0].x, 30.0);
        assert_eq!(frags[0].block, BlockKind::BulletItem);
    }

    #[test]
    fn test_long_paragraph_wraps_within_width() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        let text = "The mitochondria is the powerhouse of the cell. ".repeat(6);
        let events = engine.layout(&classify(&text), &mut cursor);
        let frags = fragments(&events);

        assert!(frags.len() >= 2, "expected wrap, got {} lines", frags.len());
        let metrics = get_metrics(FontWeight::Normal);
        for f in &frags {
            assert!(metrics.measure(&f.text, f.font_size) <= A4.wrap_width());
        }
        assert_eq!(cursor.y, 20.0 + 7.0 * frags.len() as f32);
    }

    #[test]
    fn test_wrapped_bullet_respects_indent() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        let text = format!("- {}", "osmosis ".repeat(30));
        let events = engine.layout(&classify(&text), &mut cursor);
        let frags = fragments(&events);

        assert!(frags.len() >= 2);
        let metrics = get_metrics(FontWeight::Normal);
        for f in &frags {
            assert_eq!(f.x, 30.0);
            assert!(metrics.measure(&f.text, f.font_size) <= A4.wrap_width() - A4.bullet_indent);
        }
        assert!(frags[0].text.starts_with("• "));
        assert!(!frags[1].text.starts_with("• "));
    }

    #[test]
    fn test_page_break_is_checked_per_sub_line() {
        let engine = TextLayoutEngine::new(A4);
        let mut cursor = LayoutCursor::new(&A4);
        // One line's worth of room left on the page.
        cursor.y = 272.0;
        let text = "word ".repeat(60);
        let events = engine.layout(&classify(&text), &mut cursor);

        assert!(matches!(events[0], LayoutEvent::Fragment(ref f) if f.y == 272.0));
        assert_eq!(events[1], LayoutEvent::PageBreak);
        assert!(matches!(events[2], LayoutEvent::Fragment(ref f) if f.y == 20.0));
        assert_eq!(cursor.page, 1);
    }
}
