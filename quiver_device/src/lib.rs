// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering context that Quiver's plotting primitives draw into.
//!
//! Plotting code never owns a surface. It receives a `&mut impl Device` and
//! talks to it through a narrow interface:
//! - readiness and diagnostics,
//! - a stroke primitive for arrows,
//! - a nesting-aware buffering window,
//! - a stack of coordinate spaces (world, normalized, device), and
//! - text measurement plus the character-height font state.
//!
//! Mutations of shared state are wrapped in [`BufferScope`] and [`StateScope`],
//! which undo themselves on drop so every exit path leaves the device as it
//! was found.
//!
//! [`RecordingDevice`] is an in-memory implementation with a real transform
//! stack. It records what was drawn and is the fake used by tests and demos.

#![no_std]

extern crate alloc;

mod recording;
mod scope;

use kurbo::{Point, Size, Vec2};

pub use recording::{BufferCounts, Diagnostic, RecordedArrow, RecordingDevice, Severity};
pub use scope::{BufferScope, StateScope};

/// The coordinate space that point conversions are interpreted in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformSpace {
    /// User data coordinates, mapped through the world window and viewport.
    #[default]
    World,
    /// Device coordinates: user space equals device space.
    Identity,
    /// Device space scaled to `[0, 1]` per axis.
    Normalized,
}

/// Physical characteristics of an output surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceInfo {
    /// Surface width in device units.
    pub width: f64,
    /// Surface height in device units.
    pub height: f64,
    /// Device units per output pixel.
    pub units_per_pixel: f64,
    /// Device units per millimetre.
    pub units_per_mm: f64,
}

impl DeviceInfo {
    /// A surface measured in PostScript points (72 per inch).
    #[must_use]
    pub fn points(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            units_per_pixel: 1.0,
            units_per_mm: 72.0 / 25.4,
        }
    }

    /// Sets the device units per pixel.
    #[must_use]
    pub fn with_units_per_pixel(mut self, units_per_pixel: f64) -> Self {
        self.units_per_pixel = units_per_pixel;
        self
    }

    /// Sets the device units per millimetre.
    #[must_use]
    pub fn with_units_per_mm(mut self, units_per_mm: f64) -> Self {
        self.units_per_mm = units_per_mm;
        self
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::points(800.0, 600.0)
    }
}

/// A rendering context.
///
/// Not thread-safe by contract: callers serialize access, and plotting
/// primitives take `&mut self` for the duration of a call.
pub trait Device {
    /// Returns whether the device can accept drawing. `caller` names the
    /// entry point for diagnostics.
    fn is_ready(&self, caller: &str) -> bool;

    /// Reports a user-visible error. The calling operation aborts.
    fn report_error(&mut self, caller: &str, message: &str);

    /// Reports a user-visible warning. The calling operation continues.
    fn report_warning(&mut self, caller: &str, message: &str);

    /// Strokes an arrow from `from` (tail) to `to` (head), in the active space.
    fn draw_arrow(&mut self, from: Point, to: Point);

    /// Opens a buffering window.
    fn begin_buffer(&mut self);

    /// Closes the innermost buffering window.
    fn end_buffer(&mut self);

    /// Returns whether any buffering window is open.
    fn is_buffering(&self) -> bool;

    /// Pushes buffered drawing to the output surface.
    fn flush(&mut self);

    /// Returns the active coordinate space.
    fn transform_space(&self) -> TransformSpace;

    /// Selects the coordinate space for subsequent conversions.
    fn set_transform_space(&mut self, space: TransformSpace);

    /// Saves the transform state.
    fn save(&mut self);

    /// Restores the most recently saved transform state.
    fn restore(&mut self);

    /// Maps a point from the active space to device space.
    fn user_to_device(&self, p: Point) -> Point;

    /// Maps a point from device space to the active space.
    fn device_to_user(&self, p: Point) -> Point;

    /// Maps a displacement from the active space to device space.
    fn user_to_device_distance(&self, v: Vec2) -> Vec2;

    /// Maps a displacement from device space to the active space.
    fn device_to_user_distance(&self, v: Vec2) -> Vec2;

    /// Measures `text` in device units without drawing it.
    ///
    /// Formatting escapes are honored, and may leave the character height
    /// changed; callers that need it preserved must save it.
    fn measure_text(&mut self, text: &str) -> Size;

    /// Returns the character height (`1.0` is the default font size).
    fn character_height(&self) -> f64;

    /// Sets the character height.
    fn set_character_height(&mut self, height: f64);

    /// Returns the surface metadata.
    fn info(&self) -> DeviceInfo;
}
