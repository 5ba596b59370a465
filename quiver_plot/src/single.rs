// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-precision entry points.
//!
//! These widen their inputs, run the `f64` implementation, and narrow the
//! results. No geometry is computed in `f32`.

use alloc::vec::Vec;

use kurbo::Point;
use quiver_device::Device;

use crate::{
    ArrowScale, RenderOutcome, TextQuery, Units, VectorFieldError, VectorFieldSpec, VectorGrid,
    render, text_box, text_extent,
};

impl ArrowScale {
    /// Interprets a raw `f32` scale factor; values below `f32::MIN_POSITIVE`
    /// in magnitude mean [`ArrowScale::Auto`].
    #[must_use]
    pub fn from_factor_f32(factor: f32) -> Self {
        if factor.abs() < f32::MIN_POSITIVE {
            Self::Auto
        } else {
            Self::Fixed(f64::from(factor))
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "narrowing back to the caller's precision is the point"
)]
fn narrow(x: f64) -> f32 {
    x as f32
}

/// [`render`] for `f32` component slices.
///
/// `spec` is shared with the `f64` path; build its blank sentinel with
/// `f64::from` so comparisons against widened samples stay exact.
pub fn render_f32<D: Device + ?Sized>(
    device: &mut D,
    horizontal: &[f32],
    vertical: &[f32],
    columns: usize,
    rows: usize,
    spec: &VectorFieldSpec,
) -> Result<RenderOutcome, VectorFieldError> {
    let horizontal: Vec<f64> = horizontal.iter().copied().map(f64::from).collect();
    let vertical: Vec<f64> = vertical.iter().copied().map(f64::from).collect();
    render(
        device,
        &VectorGrid::new(&horizontal, &vertical, columns, rows),
        spec,
    )
}

/// [`text_box`] returning `f32` corner coordinates as `(xs, ys)`.
pub fn text_box_f32<D: Device + ?Sized>(
    device: &mut D,
    anchor: [f32; 2],
    angle: f32,
    justification: f32,
    text: &str,
) -> Option<([f32; 4], [f32; 4])> {
    let query = TextQuery::new(
        Point::new(f64::from(anchor[0]), f64::from(anchor[1])),
        text,
    )
    .with_angle(f64::from(angle))
    .with_justification(f64::from(justification));
    let b = text_box(device, &query)?;
    Some((b.xs().map(narrow), b.ys().map(narrow)))
}

/// [`text_extent`] returning `(width, height)` in `f32`.
pub fn text_extent_f32<D: Device + ?Sized>(
    device: &mut D,
    text: &str,
    units: Units,
) -> (f32, f32) {
    let size = text_extent(device, text, units);
    (narrow(size.width), narrow(size.height))
}

#[cfg(test)]
mod tests {
    use quiver_device::RecordingDevice;

    use super::*;
    use crate::ArrowAnchor;

    #[test]
    fn f32_grid_matches_scenario() {
        let mut device = RecordingDevice::new();
        let spec = VectorFieldSpec::new(0..=1, 0..=0)
            .with_scale(ArrowScale::from_factor_f32(0.0))
            .with_anchor(ArrowAnchor::TailAtPoint);
        let outcome = render_f32(&mut device, &[3.0, 0.0], &[4.0, 0.0], 2, 1, &spec).unwrap();
        assert!(matches!(outcome, RenderOutcome::Drawn { arrows: 1, .. }));
        let arrow = device.arrows()[0];
        assert!((arrow.from.x + 0.1).abs() < 1e-9);
        assert!((arrow.from.y + 0.3).abs() < 1e-9);
    }

    #[test]
    fn f32_blank_sentinel_survives_widening() {
        let blank = 0.1_f32;
        let spec = VectorFieldSpec::new(0..=1, 0..=0)
            .with_scale(ArrowScale::Fixed(1.0))
            .with_blank(f64::from(blank));
        let mut device = RecordingDevice::new();
        render_f32(&mut device, &[blank, 1.0], &[blank, 1.0], 2, 1, &spec).unwrap();
        assert_eq!(device.arrows().len(), 1);
    }

    #[test]
    fn f32_text_queries_narrow_results() {
        let mut device = RecordingDevice::new();
        let (xs, ys) = text_box_f32(&mut device, [0.5, 0.5], 0.0, 0.0, "abcd").unwrap();
        assert!((xs[3] - 0.545).abs() < 1e-6);
        assert!((ys[1] - 0.525).abs() < 1e-6);

        let (w, h) = text_extent_f32(&mut device, "abcd", Units::Device);
        assert_eq!((w, h), (36.0, 15.0));
    }
}
