// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for plot annotations.
//!
//! Quiver never rasterizes or shapes glyphs itself. Geometry queries such as
//! "how big is this label" go through a tiny measurement interface that a
//! shaping engine (or a heuristic) implements, and through [`measure_formatted`],
//! which walks the super/subscript escapes understood by plot labels.
//!
//! This crate is:
//! - small and dependency-free,
//! - `no_std`-friendly (it uses `alloc` for owned font family names), and
//! - backend-agnostic.

#![no_std]

extern crate alloc;

mod script;

use alloc::boxed::Box;
use alloc::sync::Arc;

pub use script::{
    FormattedExtent, SCRIPT_RAISE, SCRIPT_SCALE, ScriptToken, ScriptTokens, measure_formatted,
    script_factor,
};

/// A minimal text measurement interface.
///
/// Implementations can be heuristic, or backed by a shaping engine such as
/// Parley. Escape sequences are resolved before text reaches the measurer.
pub trait TextMeasurer {
    /// Measure a single run of plain text.
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for Box<M> {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }
}

/// Text styling inputs relevant to measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in device units.
    pub font_size: f64,
    /// The preferred font family.
    pub font_family: FontFamily,
    /// Font weight (e.g. `400` for normal, `700` for bold).
    pub font_weight: FontWeight,
    /// Whether glyphs are upright or slanted.
    pub font_style: FontStyle,
}

impl TextStyle {
    /// Creates a sans-serif, normal-weight `TextStyle` of the given size.
    #[must_use]
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            font_family: FontFamily::SansSerif,
            font_weight: FontWeight::NORMAL,
            font_style: FontStyle::Normal,
        }
    }

    /// Returns a copy of this style with the font size multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            font_size: self.font_size * factor,
            ..self.clone()
        }
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    /// Sets the font style.
    #[must_use]
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.font_style = style;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Font family selection for measurement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A generic serif family.
    Serif,
    /// A generic sans-serif family.
    SansSerif,
    /// A generic monospace family.
    Monospace,
    /// A named family (e.g. `"Inter"`).
    Named(Arc<str>),
}

/// CSS-style font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal weight (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold weight (`700`).
    pub const BOLD: Self = Self(700);
}

/// Upright or slanted glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Normal style.
    Normal,
    /// Italic style.
    Italic,
    /// Oblique style.
    Oblique,
}

/// Measured metrics for a single run of text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// The advance width.
    pub advance_width: f64,
    /// Distance from baseline to the top of typical glyphs.
    pub ascent: f64,
    /// Distance from baseline to the bottom of typical glyphs.
    pub descent: f64,
    /// Additional line spacing beyond ascent+descent.
    pub leading: f64,
}

impl TextMetrics {
    /// Returns `ascent + descent`, the ink height of a line.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// A heuristic text measurer for tests and demos.
///
/// It assumes an average glyph width of 0.6em, an ascent of 0.8em and a
/// descent of 0.2em, so every measurement is exact and reproducible.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        TextMetrics {
            advance_width: 0.6 * style.font_size * text.chars().count() as f64,
            ascent: 0.8 * style.font_size,
            descent: 0.2 * style.font_size,
            leading: 0.0,
        }
    }
}
