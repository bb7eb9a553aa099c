//! Inline markup tokenizer for paragraph text.
//!
//! Produces typed runs instead of running regex substitutions. Code and math
//! spans are found first and are opaque (nothing inside them is interpreted).
//! Emphasis is then resolved in two passes over the remaining characters,
//! `**bold**` before `*italic*`, so a `*` left inside a bold span can still
//! pair with one outside it (`***x***` is bold italic `x`). An opening
//! delimiter with no matching close is kept as literal text.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    Plain,
    Bold,
    Italic,
    BoldItalic,
    Code,
    Math,
}

/// A span of text with the inline style it was marked up with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub style: RunStyle,
    pub text: String,
}

/// One source character plus the markup that applies to it.
#[derive(Debug, Clone, Copy)]
struct Marked {
    ch: char,
    bold: bool,
    italic: bool,
    /// `Some(Code | Math)` once the character sits inside an opaque span.
    opaque: Option<RunStyle>,
}

impl Marked {
    fn style(&self) -> RunStyle {
        match (self.opaque, self.bold, self.italic) {
            (Some(style), _, _) => style,
            (None, true, true) => RunStyle::BoldItalic,
            (None, true, false) => RunStyle::Bold,
            (None, false, true) => RunStyle::Italic,
            (None, false, false) => RunStyle::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn width(self) -> usize {
        match self {
            Emphasis::Bold => 2,
            Emphasis::Italic => 1,
        }
    }
}

/// Splits `text` into styled runs with delimiters removed.
pub fn tokenize(text: &str) -> Vec<InlineRun> {
    let marked: Vec<Marked> = text
        .chars()
        .map(|ch| Marked {
            ch,
            bold: false,
            italic: false,
            opaque: None,
        })
        .collect();

    let marked = resolve_opaque(marked);
    let marked = resolve_emphasis(marked, Emphasis::Bold);
    let marked = resolve_emphasis(marked, Emphasis::Italic);

    let mut runs: Vec<InlineRun> = Vec::new();
    for m in marked {
        let style = m.style();
        match runs.last_mut() {
            Some(run) if run.style == style => run.text.push(m.ch),
            _ => runs.push(InlineRun {
                style,
                text: m.ch.to_string(),
            }),
        }
    }
    runs
}

/// Removes bold, italic, inline code and inline math delimiters from `text`.
pub fn strip_inline(text: &str) -> String {
    tokenize(text).into_iter().map(|run| run.text).collect()
}

/// Marks `` `code` `` and `$math$` spans, left to right, and drops their delimiters.
fn resolve_opaque(chars: Vec<Marked>) -> Vec<Marked> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let style = match chars[i].ch {
            '`' => Some(RunStyle::Code),
            '$' => Some(RunStyle::Math),
            _ => None,
        };
        let close = style.and_then(|style| {
            let delim = chars[i].ch;
            (i + 2..chars.len())
                .find(|&j| chars[j].ch == delim)
                .map(|j| (style, j))
        });
        match close {
            Some((style, end)) => {
                out.extend(chars[i + 1..end].iter().map(|m| Marked {
                    opaque: Some(style),
                    ..*m
                }));
                i = end + 1;
            }
            None => {
                if style.is_some() {
                    debug!(position = i, delimiter = %chars[i].ch, "unmatched inline delimiter");
                }
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// Pairs emphasis delimiters outside opaque spans, non-greedily, and drops them.
fn resolve_emphasis(chars: Vec<Marked>, emphasis: Emphasis) -> Vec<Marked> {
    let width = emphasis.width();
    let is_delim = |at: usize| {
        at + width <= chars.len()
            && chars[at..at + width]
                .iter()
                .all(|m| m.ch == '*' && m.opaque.is_none())
    };

    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if !is_delim(i) {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match (i + width + 1..chars.len()).find(|&j| is_delim(j)) {
            Some(end) => {
                out.extend(chars[i + width..end].iter().map(|m| match emphasis {
                    Emphasis::Bold => Marked { bold: true, ..*m },
                    Emphasis::Italic => Marked { italic: true, ..*m },
                }));
                i = end + width;
            }
            None => {
                debug!(position = i, ?emphasis, "unmatched emphasis delimiter");
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mixed_markup() {
        assert_eq!(
            strip_inline("**bold** and *italic* and `code`"),
            "bold and italic and code"
        );
    }

    #[test]
    fn test_strip_inline_math() {
        assert_eq!(strip_inline("energy is $E = mc^2$ here"), "energy is E = mc^2 here");
    }

    #[test]
    fn test_bold_takes_precedence_over_italic() {
        let runs = tokenize("**strong**");
        assert_eq!(
            runs,
            vec![InlineRun {
                style: RunStyle::Bold,
                text: "strong".to_string()
            }]
        );
    }

    #[test]
    fn test_italic_nested_in_bold_is_flattened() {
        assert_eq!(strip_inline("**a *b* c**"), "a b c");
    }

    #[test]
    fn test_bold_italic_triple_star() {
        assert_eq!(strip_inline("***x***"), "x");
        assert_eq!(
            tokenize("***x***"),
            vec![InlineRun {
                style: RunStyle::BoldItalic,
                text: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_bold_nested_in_italic_is_flattened() {
        assert_eq!(strip_inline("*a **b** c*"), "a b c");
    }

    #[test]
    fn test_emphasis_inside_code_is_kept() {
        assert_eq!(strip_inline("**see `a**b`**"), "see a**b");
    }

    #[test]
    fn test_code_span_is_opaque() {
        let runs = tokenize("`a * b * c`");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style, RunStyle::Code);
        assert_eq!(runs[0].text, "a * b * c");
    }

    #[test]
    fn test_unmatched_delimiters_stay_literal() {
        assert_eq!(strip_inline("costs $5 and 2 * 3"), "costs $5 and 2 * 3");
        assert_eq!(strip_inline("**open only"), "**open only");
    }

    #[test]
    fn test_empty_delimiter_pair_is_literal() {
        assert_eq!(strip_inline("a `` b"), "a `` b");
    }

    #[test]
    fn test_run_styles_in_order() {
        let styles: Vec<RunStyle> = tokenize("x *y* `z` $w$")
            .into_iter()
            .map(|r| r.style)
            .collect();
        assert_eq!(
            styles,
            vec![
                RunStyle::Plain,
                RunStyle::Italic,
                RunStyle::Plain,
                RunStyle::Code,
                RunStyle::Plain,
                RunStyle::Math,
            ]
        );
    }
}
