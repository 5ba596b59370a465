// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Device`] that records what was drawn.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use quiver_text::{HeuristicTextMeasurer, TextMeasurer, TextStyle, measure_formatted, script_factor};

use crate::{Device, DeviceInfo, TransformSpace};

/// Number of default-height text lines that fit the surface height.
const LINES_PER_HEIGHT: f64 = 40.0;

/// Severity of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The reporting operation aborted.
    Error,
    /// The reporting operation fell back and continued.
    Warning,
}

/// A diagnostic reported through [`Device::report_error`] or [`Device::report_warning`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// The entry point that reported it.
    pub caller: String,
    /// Human-readable message.
    pub message: String,
}

/// One call to [`Device::draw_arrow`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedArrow {
    /// Tail, in the space that was active when drawn.
    pub from: Point,
    /// Head, in the space that was active when drawn.
    pub to: Point,
    /// The active space at draw time.
    pub space: TransformSpace,
    /// Whether a buffering window was open at draw time.
    pub buffered: bool,
}

impl RecordedArrow {
    /// The arrow as a displacement from tail to head.
    #[must_use]
    pub fn vector(&self) -> Vec2 {
        self.to - self.from
    }

    /// The midpoint of the shaft.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.from.midpoint(self.to)
    }
}

/// Counts of buffering calls observed by a [`RecordingDevice`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferCounts {
    /// Calls to [`Device::begin_buffer`].
    pub begins: usize,
    /// Calls to [`Device::end_buffer`].
    pub ends: usize,
    /// Calls to [`Device::flush`].
    pub flushes: usize,
}

impl BufferCounts {
    /// Returns `true` if no buffering call was made.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        *self == Self::default()
    }
}

/// A device with a real transform stack that records its output.
///
/// Device space has its origin at the top-left with y growing downward.
/// Normalized space maps `[0, 1]²` onto the surface with y growing upward,
/// and world space maps the world window onto the viewport (a normalized
/// rectangle).
///
/// Text is measured with `M`; the font size is the character height times
/// one fortieth of the surface height.
#[derive(Clone, Debug)]
pub struct RecordingDevice<M = HeuristicTextMeasurer> {
    info: DeviceInfo,
    ready: bool,
    measurer: M,
    viewport: Rect,
    window: Rect,
    space: TransformSpace,
    saved: Vec<TransformSpace>,
    character_height: f64,
    buffer_depth: usize,
    counts: BufferCounts,
    arrows: Vec<RecordedArrow>,
    diagnostics: Vec<Diagnostic>,
}

impl RecordingDevice {
    /// Creates a ready device with the heuristic text measurer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_measurer(HeuristicTextMeasurer)
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMeasurer> RecordingDevice<M> {
    /// Creates a ready device that measures text with `measurer`.
    pub fn with_measurer(measurer: M) -> Self {
        Self {
            info: DeviceInfo::default(),
            ready: true,
            measurer,
            viewport: Rect::new(0.0, 0.0, 1.0, 1.0),
            window: Rect::new(0.0, 0.0, 1.0, 1.0),
            space: TransformSpace::World,
            saved: Vec::new(),
            character_height: 1.0,
            buffer_depth: 0,
            counts: BufferCounts::default(),
            arrows: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Sets the surface metadata.
    #[must_use]
    pub fn with_info(mut self, info: DeviceInfo) -> Self {
        self.info = info;
        self
    }

    /// Sets the viewport, in normalized coordinates.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    /// Sets the world window mapped onto the viewport.
    #[must_use]
    pub fn with_window(mut self, window: Rect) -> Self {
        self.window = window;
        self
    }

    /// Marks the device as open or closed.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Arrows drawn so far.
    #[must_use]
    pub fn arrows(&self) -> &[RecordedArrow] {
        &self.arrows
    }

    /// Removes and returns the recorded arrows.
    pub fn take_arrows(&mut self) -> Vec<RecordedArrow> {
        core::mem::take(&mut self.arrows)
    }

    /// Diagnostics reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Buffering calls observed so far.
    #[must_use]
    pub fn buffer_counts(&self) -> BufferCounts {
        self.counts
    }

    /// Current nesting depth of buffering windows.
    #[must_use]
    pub fn buffer_depth(&self) -> usize {
        self.buffer_depth
    }

    /// Font size in device units at the current character height.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.character_height * self.info.height / LINES_PER_HEIGHT
    }

    /// The affine map from the given space to device space.
    #[must_use]
    pub fn space_to_device(&self, space: TransformSpace) -> Affine {
        let DeviceInfo { width, height, .. } = self.info;
        let normalized = Affine::new([width, 0.0, 0.0, -height, 0.0, height]);
        match space {
            TransformSpace::Identity => Affine::IDENTITY,
            TransformSpace::Normalized => normalized,
            TransformSpace::World => {
                let (w, v) = (self.window, self.viewport);
                let sx = v.width() / w.width();
                let sy = v.height() / w.height();
                let window_to_viewport =
                    Affine::new([sx, 0.0, 0.0, sy, v.x0 - w.x0 * sx, v.y0 - w.y0 * sy]);
                normalized * window_to_viewport
            }
        }
    }

    fn active(&self) -> Affine {
        self.space_to_device(self.space)
    }

    fn record(&mut self, severity: Severity, caller: &str, message: &str) {
        self.diagnostics.push(Diagnostic {
            severity,
            caller: caller.to_string(),
            message: message.to_string(),
        });
    }
}

fn linear(affine: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

impl<M: TextMeasurer> Device for RecordingDevice<M> {
    fn is_ready(&self, caller: &str) -> bool {
        if !self.ready {
            log::warn!("{caller}: no device open");
        }
        self.ready
    }

    fn report_error(&mut self, caller: &str, message: &str) {
        log::error!("{caller}: {message}");
        self.record(Severity::Error, caller, message);
    }

    fn report_warning(&mut self, caller: &str, message: &str) {
        log::warn!("{caller}: {message}");
        self.record(Severity::Warning, caller, message);
    }

    fn draw_arrow(&mut self, from: Point, to: Point) {
        log::trace!("arrow {from:?} -> {to:?}");
        self.arrows.push(RecordedArrow {
            from,
            to,
            space: self.space,
            buffered: self.buffer_depth > 0,
        });
    }

    fn begin_buffer(&mut self) {
        self.counts.begins += 1;
        self.buffer_depth += 1;
    }

    fn end_buffer(&mut self) {
        self.counts.ends += 1;
        self.buffer_depth = self.buffer_depth.saturating_sub(1);
    }

    fn is_buffering(&self) -> bool {
        self.buffer_depth > 0
    }

    fn flush(&mut self) {
        self.counts.flushes += 1;
    }

    fn transform_space(&self) -> TransformSpace {
        self.space
    }

    fn set_transform_space(&mut self, space: TransformSpace) {
        self.space = space;
    }

    fn save(&mut self) {
        self.saved.push(self.space);
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(space) => self.space = space,
            None => log::warn!("restore without matching save"),
        }
    }

    fn user_to_device(&self, p: Point) -> Point {
        self.active() * p
    }

    fn device_to_user(&self, p: Point) -> Point {
        self.active().inverse() * p
    }

    fn user_to_device_distance(&self, v: Vec2) -> Vec2 {
        linear(self.active(), v)
    }

    fn device_to_user_distance(&self, v: Vec2) -> Vec2 {
        linear(self.active().inverse(), v)
    }

    fn measure_text(&mut self, text: &str) -> Size {
        let style = TextStyle::new(self.font_size());
        let extent = measure_formatted(&self.measurer, text, &style);
        // The layout pass leaves the font at the level the label ended in.
        self.character_height *= script_factor(extent.final_level);
        Size::new(extent.width, extent.height)
    }

    fn character_height(&self) -> f64 {
        self.character_height
    }

    fn set_character_height(&mut self, height: f64) {
        self.character_height = height;
    }

    fn info(&self) -> DeviceInfo {
        self.info
    }
}
