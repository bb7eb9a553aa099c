//! Line classification: one line of canonical markdown → one typed `Block`.

use serde::{Deserialize, Serialize};

use crate::layout::inline::strip_inline;

/// A classified unit of text. Produced per input line; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    BulletItem { text: String },
    Paragraph { text: String },
    BlankLine,
}

/// Block kind without its text, carried on positioned fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    BulletItem,
    Paragraph,
    BlankLine,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading { level: 1, .. } => BlockKind::Heading1,
            Block::Heading { level: 2, .. } => BlockKind::Heading2,
            Block::Heading { .. } => BlockKind::Heading3,
            Block::BulletItem { .. } => BlockKind::BulletItem,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::BlankLine => BlockKind::BlankLine,
        }
    }
}

// Longest prefix first, so "### " never matches as "# " with a leftover "##".
const HEADING_PREFIXES: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];
const BULLET_PREFIXES: [&str; 2] = ["- ", "* "];

/// Classifies a single line. First matching rule wins; never fails.
///
/// Paragraph text has its inline markup stripped here so layout only ever
/// sees display text.
pub fn classify(line: &str) -> Block {
    for (prefix, level) in HEADING_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Block::Heading {
                level,
                text: rest.to_string(),
            };
        }
    }

    for prefix in BULLET_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Block::BulletItem {
                text: rest.to_string(),
            };
        }
    }

    if line.trim().is_empty() {
        return Block::BlankLine;
    }

    Block::Paragraph {
        text: strip_inline(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            classify("# Title"),
            Block::Heading {
                level: 1,
                text: "Title".to_string()
            }
        );
        assert_eq!(classify("## Sub").kind(), BlockKind::Heading2);
        assert_eq!(classify("### Title").kind(), BlockKind::Heading3);
    }

    #[test]
    fn test_level_three_never_leaks_hashes() {
        match classify("### Title") {
            Block::Heading { level, text } => {
                assert_eq!(level, 3);
                assert_eq!(text, "Title");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_without_space_is_paragraph() {
        assert_eq!(classify("#hashtag").kind(), BlockKind::Paragraph);
        assert_eq!(classify("#### deep").kind(), BlockKind::Paragraph);
    }

    #[test]
    fn test_bullets_with_dash_and_star() {
        assert_eq!(
            classify("- item one"),
            Block::BulletItem {
                text: "item one".to_string()
            }
        );
        assert_eq!(classify("* item two").kind(), BlockKind::BulletItem);
    }

    #[test]
    fn test_blank_and_whitespace_lines() {
        assert_eq!(classify(""), Block::BlankLine);
        assert_eq!(classify("   \t"), Block::BlankLine);
    }

    #[test]
    fn test_paragraph_is_stripped() {
        assert_eq!(
            classify("**bold** and *italic* and `code`"),
            Block::Paragraph {
                text: "bold and italic and code".to_string()
            }
        );
    }

    #[test]
    fn test_italic_line_is_paragraph_not_bullet() {
        assert_eq!(
            classify("*emphasis*"),
            Block::Paragraph {
                text: "emphasis".to_string()
            }
        );
    }
}
