// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Super/subscript escapes in plot labels.
//!
//! Labels may contain `\u` (raise into superscript), `\d` (lower into
//! subscript) and `\\` (a literal backslash). Any other escape is kept as
//! literal text. Each script level shrinks glyphs by [`SCRIPT_SCALE`] and
//! shifts the baseline by [`SCRIPT_RAISE`] of the base font size.

use crate::{TextMeasurer, TextStyle};

/// Glyph size multiplier applied per script level.
pub const SCRIPT_SCALE: f64 = 0.6;

/// Baseline shift per script level, as a fraction of the base font size.
pub const SCRIPT_RAISE: f64 = 0.4;

/// A lexical piece of a formatted label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptToken<'a> {
    /// Plain text to measure at the current level.
    Text(&'a str),
    /// `\u`: raise one level.
    Up,
    /// `\d`: lower one level.
    Down,
}

/// Iterator over the [`ScriptToken`]s of a label.
#[derive(Clone, Debug)]
pub struct ScriptTokens<'a> {
    rest: &'a str,
}

impl<'a> ScriptTokens<'a> {
    /// Tokenizes `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for ScriptTokens<'a> {
    type Item = ScriptToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let Some(rest) = self.rest.strip_prefix('\\') else {
            let end = self.rest.find('\\').unwrap_or(self.rest.len());
            let (text, rest) = self.rest.split_at(end);
            self.rest = rest;
            return Some(ScriptToken::Text(text));
        };
        let mut chars = rest.chars();
        let token = match chars.next() {
            Some('u') => ScriptToken::Up,
            Some('d') => ScriptToken::Down,
            Some('\\') => {
                let (text, tail) = rest.split_at(1);
                self.rest = tail;
                return Some(ScriptToken::Text(text));
            }
            Some(c) => {
                // Unknown escape: keep the backslash and the character.
                let len = 1 + c.len_utf8();
                let (text, tail) = self.rest.split_at(len);
                self.rest = tail;
                return Some(ScriptToken::Text(text));
            }
            None => {
                let text = self.rest;
                self.rest = "";
                return Some(ScriptToken::Text(text));
            }
        };
        self.rest = chars.as_str();
        Some(token)
    }
}

/// Returns the glyph size factor for a script `level` (`0` is the baseline).
#[must_use]
pub fn script_factor(level: i32) -> f64 {
    let mut factor = 1.0;
    for _ in 0..level.unsigned_abs() {
        factor *= SCRIPT_SCALE;
    }
    factor
}

/// Size of a formatted label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FormattedExtent {
    /// Total advance width.
    pub width: f64,
    /// Distance from the lowest descender to the highest ascender.
    pub height: f64,
    /// Script level after the last token. Non-zero for unbalanced labels.
    pub final_level: i32,
}

/// Measures a label, resolving script escapes.
///
/// The height always covers at least the base line box, so an empty label
/// still reports the height of the current font.
pub fn measure_formatted<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
) -> FormattedExtent {
    let base = measurer.measure("", style);
    let mut top = base.ascent;
    let mut bottom = -base.descent;
    let mut width = 0.0;
    let mut level = 0_i32;

    for token in ScriptTokens::new(text) {
        match token {
            ScriptToken::Up => level += 1,
            ScriptToken::Down => level -= 1,
            ScriptToken::Text(run) => {
                let metrics = measurer.measure(run, &style.scaled(script_factor(level)));
                let shift = f64::from(level) * SCRIPT_RAISE * style.font_size;
                width += metrics.advance_width;
                top = top.max(shift + metrics.ascent);
                bottom = bottom.min(shift - metrics.descent);
            }
        }
    }

    FormattedExtent {
        width,
        height: top - bottom,
        final_level: level,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::HeuristicTextMeasurer;

    #[test]
    fn tokens_split_on_escapes() {
        let tokens: Vec<_> = ScriptTokens::new(r"x\u2\d + a\\b\q").collect();
        assert_eq!(
            tokens,
            [
                ScriptToken::Text("x"),
                ScriptToken::Up,
                ScriptToken::Text("2"),
                ScriptToken::Down,
                ScriptToken::Text(" + a"),
                ScriptToken::Text("\\"),
                ScriptToken::Text("b"),
                ScriptToken::Text(r"\q"),
            ]
        );
    }

    #[test]
    fn trailing_backslash_is_literal() {
        let tokens: Vec<_> = ScriptTokens::new("a\\").collect();
        assert_eq!(tokens, [ScriptToken::Text("a"), ScriptToken::Text("\\")]);
    }

    #[test]
    fn plain_text_matches_measurer() {
        let style = TextStyle::new(10.0);
        let extent = measure_formatted(&HeuristicTextMeasurer, "abcd", &style);
        assert!((extent.width - 24.0).abs() < 1e-12);
        assert!((extent.height - 10.0).abs() < 1e-12);
        assert_eq!(extent.final_level, 0);
    }

    #[test]
    fn superscript_shrinks_and_raises() {
        let style = TextStyle::new(10.0);
        let extent = measure_formatted(&HeuristicTextMeasurer, r"x\u2\d", &style);
        // "x" at 10, "2" at 6.
        assert!((extent.width - (6.0 + 3.6)).abs() < 1e-12);
        // Raised run tops out at 4 + 0.8 * 6 = 8.8 over a base descent of 2.
        assert!((extent.height - 10.8).abs() < 1e-12);
        assert_eq!(extent.final_level, 0);
    }

    #[test]
    fn unbalanced_escape_reports_level() {
        let extent = measure_formatted(&HeuristicTextMeasurer, r"e\u-x", &TextStyle::new(10.0));
        assert_eq!(extent.final_level, 1);
    }

    #[test]
    fn empty_label_has_line_height() {
        let extent = measure_formatted(&HeuristicTextMeasurer, "", &TextStyle::new(10.0));
        assert_eq!(extent.width, 0.0);
        assert!((extent.height - 10.0).abs() < 1e-12);
    }
}
