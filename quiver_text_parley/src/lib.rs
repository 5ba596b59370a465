// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed text measurement adapter.
//!
//! This crate implements [`quiver_text::TextMeasurer`] using Parley, so label
//! extents and bounding boxes reflect real shaping instead of the heuristic
//! measurer.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;

use parley::style::{FontFamily as ParleyFontFamily, FontStack, GenericFamily, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontStyle as ParleyFontStyle, FontWeight};
use quiver_text::{FontFamily, FontStyle, TextMeasurer, TextMetrics, TextStyle};

/// Text used to probe line metrics when measuring an empty run.
const PROBE: &str = " ";

/// A [`TextMeasurer`] backed by Parley.
///
/// Measures single runs; script escapes are resolved upstream by
/// [`quiver_text::measure_formatted`].
pub struct ParleyTextMeasurer {
    font_cx: RefCell<FontContext>,
    layout_cx: RefCell<parley::LayoutContext<()>>,
    display_scale: f32,
}

impl core::fmt::Debug for ParleyTextMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyTextMeasurer")
            .field("display_scale", &self.display_scale)
            .finish_non_exhaustive()
    }
}

impl ParleyTextMeasurer {
    /// Creates a measurer using Parley's default system font configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            font_cx: RefCell::new(FontContext::new()),
            layout_cx: RefCell::new(parley::LayoutContext::new()),
            display_scale: 1.0,
        }
    }

    /// Sets the display scale passed to Parley.
    ///
    /// Results are divided by this scale, so they stay in device units.
    #[must_use]
    pub fn with_display_scale(mut self, display_scale: f32) -> Self {
        self.display_scale = display_scale.max(0.0);
        self
    }

    fn font_stack(family: &FontFamily) -> FontStack<'_> {
        FontStack::from(match family {
            FontFamily::Serif => ParleyFontFamily::Generic(GenericFamily::Serif),
            FontFamily::SansSerif => ParleyFontFamily::Generic(GenericFamily::SansSerif),
            FontFamily::Monospace => ParleyFontFamily::Generic(GenericFamily::Monospace),
            FontFamily::Named(name) => ParleyFontFamily::Named(Cow::Borrowed(name.as_ref())),
        })
    }

    fn font_style(style: FontStyle) -> ParleyFontStyle {
        match style {
            FontStyle::Normal => ParleyFontStyle::Normal,
            FontStyle::Italic => ParleyFontStyle::Italic,
            FontStyle::Oblique => ParleyFontStyle::Oblique(None),
        }
    }

    fn font_size(font_size: f64) -> f32 {
        if !font_size.is_finite() || font_size <= 0.0 {
            return 0.0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Font sizes beyond f32 range saturate"
        )]
        {
            font_size.min(f64::from(f32::MAX)) as f32
        }
    }

    fn line_metrics(&self, text: &str, style: &TextStyle) -> Option<TextMetrics> {
        let scale = self.display_scale.max(1.0e-6);
        let mut font_cx = self.font_cx.borrow_mut();
        let mut layout_cx = self.layout_cx.borrow_mut();

        let mut builder = layout_cx.ranged_builder(&mut font_cx, text, scale, false);
        builder.push_default(StyleProperty::FontSize(Self::font_size(style.font_size)));
        builder.push_default(StyleProperty::FontStack(Self::font_stack(
            &style.font_family,
        )));
        builder.push_default(StyleProperty::FontStyle(Self::font_style(
            style.font_style,
        )));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(f32::from(
            style.font_weight.0,
        ))));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let line = layout.lines().next()?;
        let m = line.metrics();
        let scale = f64::from(scale);
        Some(TextMetrics {
            advance_width: f64::from(m.advance) / scale,
            ascent: f64::from(m.ascent) / scale,
            descent: f64::from(m.descent) / scale,
            leading: f64::from(m.leading) / scale,
        })
    }
}

impl Default for ParleyTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for ParleyTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let text = text.split('\n').next().unwrap_or("");
        if text.is_empty() {
            // Keep the line box of the font so empty labels still have a height.
            return self
                .line_metrics(PROBE, style)
                .map(|m| TextMetrics {
                    advance_width: 0.0,
                    ..m
                })
                .unwrap_or_default();
        }
        self.line_metrics(text, style).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parley_measurer_is_nonzero_for_nonempty_text() {
        let m = ParleyTextMeasurer::new();
        let metrics = m.measure("Hello", &TextStyle::new(12.0));
        assert!(metrics.advance_width > 0.0);
        assert!(metrics.ascent > 0.0);
        assert!(metrics.descent > 0.0);
    }

    #[test]
    fn empty_text_keeps_line_height() {
        let m = ParleyTextMeasurer::new();
        let metrics = m.measure("", &TextStyle::new(12.0));
        assert_eq!(metrics.advance_width, 0.0);
        assert!(metrics.height() > 0.0);
    }
}
