// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where text would land, without drawing it.
//!
//! Both queries run the device's measurement pass inside a [`StateScope`],
//! so the transform space and character height are back to their previous
//! values when they return, whatever the label's escapes did to them.

use alloc::format;

use kurbo::{Point, Rect, Size};
use quiver_device::{Device, StateScope, TransformSpace};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::Units;

/// A label to be placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextQuery<'a> {
    /// Anchor in world coordinates.
    pub anchor: Point,
    /// Rotation in degrees.
    pub angle: f64,
    /// Horizontal justification: `0.0` left, `0.5` centered, `1.0` right.
    pub justification: f64,
    /// Label text, possibly containing formatting escapes.
    pub text: &'a str,
}

impl<'a> TextQuery<'a> {
    /// A left-justified, unrotated label at `anchor`.
    #[must_use]
    pub fn new(anchor: Point, text: &'a str) -> Self {
        Self {
            anchor,
            angle: 0.0,
            justification: 0.0,
            text,
        }
    }

    /// Sets the rotation in degrees.
    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the justification fraction.
    #[must_use]
    pub fn with_justification(mut self, justification: f64) -> Self {
        self.justification = justification;
        self
    }
}

/// The quadrilateral a label occupies, in world coordinates.
///
/// Corners are ordered so consecutive corners share an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBox {
    /// Baseline start, ascent start, ascent end, baseline end.
    pub corners: [Point; 4],
}

impl TextBox {
    /// Start of the baseline.
    #[must_use]
    pub fn baseline_start(&self) -> Point {
        self.corners[0]
    }

    /// End of the baseline.
    #[must_use]
    pub fn baseline_end(&self) -> Point {
        self.corners[3]
    }

    /// The x coordinates of the corners.
    #[must_use]
    pub fn xs(&self) -> [f64; 4] {
        self.corners.map(|p| p.x)
    }

    /// The y coordinates of the corners.
    #[must_use]
    pub fn ys(&self) -> [f64; 4] {
        self.corners.map(|p| p.y)
    }

    /// The smallest axis-aligned rectangle containing the box.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let [first, rest @ ..] = self.corners;
        rest.iter()
            .fold(Rect::from_points(first, first), |r, &p| r.union_pt(p))
    }
}

/// Returns the world-space box `query` would occupy if drawn, or `None`
/// when the device is not ready.
pub fn text_box<D: Device + ?Sized>(device: &mut D, query: &TextQuery<'_>) -> Option<TextBox> {
    let mut device = StateScope::save(device);
    if !device.is_ready("text_box") {
        return None;
    }

    device.set_transform_space(TransformSpace::Identity);
    let size = device.measure_text(query.text);

    device.set_transform_space(TransformSpace::World);
    let anchor = device.user_to_device(query.anchor);
    let corners = device_corners(anchor, size, query.angle, query.justification);
    Some(TextBox {
        corners: corners.map(|p| device.device_to_user(p)),
    })
}

/// Corners in device space, where y grows downward.
fn device_corners(anchor: Point, size: Size, angle: f64, justification: f64) -> [Point; 4] {
    let theta = angle.to_radians();
    let (cos, sin) = (theta.cos(), theta.sin());
    let Size { width, height } = size;
    let Point { x, y } = anchor;

    let x0 = x - width * justification * cos;
    let x3 = x + width * (1.0 - justification) * cos;
    let y0 = y + width * justification * sin;
    let y3 = y - width * (1.0 - justification) * sin;
    [
        Point::new(x0, y0),
        Point::new(x0 - height * sin, y0 - height * cos),
        Point::new(x3 - height * sin, y3 - height * cos),
        Point::new(x3, y3),
    ]
}

/// Returns the size `text` would occupy in `units`, or zero when the device
/// is not ready.
pub fn text_extent<D: Device + ?Sized>(device: &mut D, text: &str, units: Units) -> Size {
    extent_with(device, text, |_| units)
}

/// [`text_extent`] with a legacy integer unit selector.
///
/// Unknown codes are reported as a warning and measured in
/// [`Units::Normalized`].
pub fn text_extent_code<D: Device + ?Sized>(device: &mut D, text: &str, code: i32) -> Size {
    extent_with(device, text, |device| {
        Units::try_from(code).unwrap_or_else(|err| {
            device.report_warning(
                EXTENT_CALLER,
                &format!("{err}, using normalized device units"),
            );
            Units::Normalized
        })
    })
}

const EXTENT_CALLER: &str = "text_extent";

fn extent_with<D: Device + ?Sized>(
    device: &mut D,
    text: &str,
    units: impl FnOnce(&mut D) -> Units,
) -> Size {
    let mut device = StateScope::save(device);
    if !device.is_ready(EXTENT_CALLER) {
        return Size::ZERO;
    }
    device.set_transform_space(TransformSpace::Identity);
    let raw = device.measure_text(text);
    let units = units(&mut *device);
    units.convert(&mut *device, raw)
}
