//! Static font-metric tables and fixed page geometry for the export layout.
//!
//! Character widths are in em units (relative to font size), taken from the
//! standard Helvetica / Helvetica-Bold AFM tables. The export collaborator
//! renders with the same base-14 fonts, so greedy wrapping here matches what
//! ends up on paper to within kerning error.
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Points → page units (millimetres).
pub const PT_TO_UNIT: f32 = 25.4 / 72.0;

/// Fixed A4 page geometry, in page units (mm).
///
/// Not configurable at runtime: the export collaborator assumes these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub bullet_indent: f32,
    pub line_height: f32,
}

pub const A4: PageGeometry = PageGeometry {
    width: 210.0,
    height: 297.0,
    margin: 20.0,
    bullet_indent: 10.0,
    line_height: 7.0,
};

impl PageGeometry {
    /// Usable text width: page width minus both margins.
    pub fn wrap_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest baseline that may still receive a line before a break.
    pub fn bottom_bound(&self) -> f32 {
        self.height - self.margin
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font weight
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one weight of Helvetica.
///
/// `widths[i]` = width of ASCII character `(i + 32)` at 1em.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub weight: FontWeight,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_em(c)).sum()
    }

    /// Width of a string in page units at the given point size.
    pub fn measure(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_em(s) * size_pt * PT_TO_UNIT
    }

    fn char_em(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Greedy word-wrap of `text` into sub-lines no wider than `max_width`
    /// page units at `size_pt`.
    ///
    /// Whitespace runs collapse to a single space. A word that alone exceeds
    /// `max_width` is broken between characters. Empty or whitespace-only
    /// input yields no lines.
    pub fn wrap(&self, text: &str, size_pt: f32, max_width: f32) -> Vec<String> {
        let scale = size_pt * PT_TO_UNIT;
        let space_w = self.space_width * scale;
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_em(word) * scale;

            if word_w > max_width {
                // Oversized word: flush the open line, then hard-break by char.
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_width = 0.0;
                for c in word.chars() {
                    let char_w = self.char_em(c) * scale;
                    if !current.is_empty() && current_width + char_w > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += char_w;
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica regular — body text and bullets.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    weight: FontWeight::Normal,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

/// Helvetica-Bold — headings.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    weight: FontWeight::Bold,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

/// Returns the static metric table for a given weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Normal => &HELVETICA_TABLE,
        FontWeight::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_em_empty_returns_zero() {
        let metrics = get_metrics(FontWeight::Normal);
        assert_eq!(metrics.measure_em(""), 0.0);
    }

    #[test]
    fn test_measure_em_ascii_characters() {
        let metrics = get_metrics(FontWeight::Normal);
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = metrics.measure_em("Rust");
        assert!(
            (width - 2.056).abs() < 1e-3,
            "Rust width should be ~2.056, got {width}"
        );
    }

    #[test]
    fn test_measure_em_non_ascii_falls_back() {
        let metrics = get_metrics(FontWeight::Normal);
        let width = metrics.measure_em("•");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_measure_scales_with_point_size() {
        let metrics = get_metrics(FontWeight::Normal);
        let small = metrics.measure("heading", 11.0);
        let large = metrics.measure("heading", 22.0);
        assert!((large - 2.0 * small).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_not_narrower_than_regular() {
        let text = "Lecture notes on thermodynamics";
        let regular = get_metrics(FontWeight::Normal).measure_em(text);
        let bold = get_metrics(FontWeight::Bold).measure_em(text);
        assert!(bold >= regular, "bold {bold} < regular {regular}");
    }

    #[test]
    fn test_a4_geometry() {
        assert_eq!(A4.wrap_width(), 170.0);
        assert_eq!(A4.bottom_bound(), 277.0);
    }

    // ── wrap ────────────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_empty_text_yields_no_lines() {
        let metrics = get_metrics(FontWeight::Normal);
        assert!(metrics.wrap("   ", 11.0, 170.0).is_empty());
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let metrics = get_metrics(FontWeight::Normal);
        assert_eq!(metrics.wrap("Some text", 11.0, 170.0), vec!["Some text"]);
    }

    #[test]
    fn test_wrap_long_text_splits_within_width() {
        let metrics = get_metrics(FontWeight::Normal);
        let text = "entropy ".repeat(40);
        let lines = metrics.wrap(&text, 11.0, 170.0);
        assert!(lines.len() >= 2, "expected wrap, got {lines:?}");
        for line in &lines {
            let w = metrics.measure(line, 11.0);
            assert!(w <= 170.0, "line too wide ({w}): {line}");
        }
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn test_wrap_breaks_oversized_word() {
        let metrics = get_metrics(FontWeight::Bold);
        let word = "W".repeat(200);
        let lines = metrics.wrap(&word, 18.0, 170.0);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(metrics.measure(line, 18.0) <= 170.0);
        }
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_oversized_word_after_short_word() {
        let metrics = get_metrics(FontWeight::Normal);
        let long = "m".repeat(120);
        let text = format!("see {long} end");
        let lines = metrics.wrap(&text, 11.0, 170.0);
        assert_eq!(lines.first().map(String::as_str), Some("see"));
        assert!(lines.last().is_some_and(|l| l.ends_with("end")));
    }
}
