// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector fields drawn as grids of arrows.
//!
//! Each sample `(i, j)` of a [`VectorGrid`] becomes one arrow anchored at the
//! cell center `(i + 0.5, j + 0.5)`, scaled by an [`ArrowScale`], placed by an
//! [`ArrowAnchor`], and mapped through an affine transform into the device's
//! active space.

use alloc::string::ToString;
use core::cmp::Ordering;
use core::ops::RangeInclusive;

use kurbo::{Affine, Point, Vec2};
use quiver_device::{BufferScope, Device};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::VectorFieldError;

const CALLER: &str = "vector_field";

/// A dense grid of `(horizontal, vertical)` samples.
///
/// Samples are stored row-major: sample `(i, j)` lives at index
/// `j * columns + i` of both component slices.
#[derive(Clone, Copy, Debug)]
pub struct VectorGrid<'a> {
    horizontal: &'a [f64],
    vertical: &'a [f64],
    columns: usize,
    rows: usize,
}

impl<'a> VectorGrid<'a> {
    /// Borrows component slices as a `columns` × `rows` grid.
    ///
    /// Slice lengths are checked when the grid is rendered.
    #[must_use]
    pub fn new(horizontal: &'a [f64], vertical: &'a [f64], columns: usize, rows: usize) -> Self {
        Self {
            horizontal,
            vertical,
            columns,
            rows,
        }
    }

    /// Grid width (`n`).
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Grid height (`m`).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn sample(&self, i: usize, j: usize) -> (f64, f64) {
        let k = j * self.columns + i;
        (self.horizontal[k], self.vertical[k])
    }

    fn check_len(&self) -> Result<(), VectorFieldError> {
        let expected = self.columns.saturating_mul(self.rows);
        let len = self.horizontal.len().min(self.vertical.len());
        if len < expected {
            return Err(VectorFieldError::ShortGrid { len, expected });
        }
        Ok(())
    }
}

/// How arrow lengths relate to sample magnitudes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ArrowScale {
    /// Arrow length is `factor * magnitude` in grid units. A zero (or
    /// subnormal) factor is treated as [`ArrowScale::Auto`].
    Fixed(f64),
    /// Derive the factor so the longest arrow spans one cell along the
    /// tighter transformed axis.
    #[default]
    Auto,
}

impl ArrowScale {
    /// Interprets a raw scale factor; zero (or subnormal) means [`ArrowScale::Auto`].
    #[must_use]
    pub fn from_factor(factor: f64) -> Self {
        if factor.abs() < f64::MIN_POSITIVE {
            Self::Auto
        } else {
            Self::Fixed(factor)
        }
    }
}

/// Where the cell center sits on the drawn arrow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArrowAnchor {
    /// The arrow points at the cell: its head is on the center and the
    /// tail trails behind.
    TailAtPoint,
    /// The shaft is centered on the cell.
    Centered,
    /// The arrow starts at the cell: its tail is on the center.
    #[default]
    HeadAtPoint,
}

impl ArrowAnchor {
    /// Maps a legacy position selector: negative, zero, or positive.
    #[must_use]
    pub fn from_position(position: i32) -> Self {
        match position.cmp(&0) {
            Ordering::Less => Self::TailAtPoint,
            Ordering::Equal => Self::Centered,
            Ordering::Greater => Self::HeadAtPoint,
        }
    }

    /// Returns `(tail, head)` for an arrow of displacement `offset` anchored at `point`.
    #[must_use]
    pub fn place(self, point: Point, offset: Vec2) -> (Point, Point) {
        match self {
            Self::TailAtPoint => (point - offset, point),
            Self::Centered => {
                let head = point + offset * 0.5;
                (head - offset, head)
            }
            Self::HeadAtPoint => (point, point + offset),
        }
    }
}

/// When the affine transform is applied to an arrow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformOrder {
    /// Build the arrow in grid space, then transform both endpoints.
    /// Arrows shear and rotate with the grid.
    #[default]
    Endpoints,
    /// Transform the cell center, then add the scaled offset in the
    /// transformed space. Arrows keep their data direction.
    CellCenter,
}

/// Everything besides the samples that controls a vector-field plot.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorFieldSpec {
    /// Inclusive column range `i1..=i2` to draw.
    pub columns: RangeInclusive<isize>,
    /// Inclusive row range `j1..=j2` to draw.
    pub rows: RangeInclusive<isize>,
    /// Arrow scale policy.
    pub scale: ArrowScale,
    /// Arrow placement relative to the cell center.
    pub anchor: ArrowAnchor,
    /// Grid-to-user affine map.
    pub affine: Affine,
    /// Sentinel marking missing components.
    pub blank: f64,
    /// Where the affine map is applied.
    pub order: TransformOrder,
}

impl VectorFieldSpec {
    /// Creates a spec for the given index ranges with auto scaling, arrows
    /// starting at the cell centers, an identity transform, and `0.0` as
    /// the blank sentinel.
    #[must_use]
    pub fn new(columns: RangeInclusive<isize>, rows: RangeInclusive<isize>) -> Self {
        Self {
            columns,
            rows,
            scale: ArrowScale::Auto,
            anchor: ArrowAnchor::default(),
            affine: Affine::IDENTITY,
            blank: 0.0,
            order: TransformOrder::default(),
        }
    }

    /// Creates a spec covering every cell of `grid`.
    #[must_use]
    pub fn covering(grid: &VectorGrid<'_>) -> Self {
        let last = |len: usize| isize::try_from(len).unwrap_or(isize::MAX) - 1;
        Self::new(0..=last(grid.columns), 0..=last(grid.rows))
    }

    /// Sets the scale policy.
    #[must_use]
    pub fn with_scale(mut self, scale: ArrowScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the anchor policy.
    #[must_use]
    pub fn with_anchor(mut self, anchor: ArrowAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the grid-to-user transform.
    #[must_use]
    pub fn with_affine(mut self, affine: Affine) -> Self {
        self.affine = affine;
        self
    }

    /// Sets the blank sentinel.
    #[must_use]
    pub fn with_blank(mut self, blank: f64) -> Self {
        self.blank = blank;
        self
    }

    /// Sets where the affine map is applied.
    #[must_use]
    pub fn with_transform_order(mut self, order: TransformOrder) -> Self {
        self.order = order;
        self
    }

    fn cells(&self, grid: &VectorGrid<'_>) -> Result<Cells, VectorFieldError> {
        let (i1, i2) = (*self.columns.start(), *self.columns.end());
        let (j1, j2) = (*self.rows.start(), *self.rows.end());
        let Some(columns) = index_range(i1, i2, grid.columns) else {
            return Err(VectorFieldError::InvalidColumnRange {
                start: i1,
                end: i2,
                columns: grid.columns,
            });
        };
        let Some(rows) = index_range(j1, j2, grid.rows) else {
            return Err(VectorFieldError::InvalidRowRange {
                start: j1,
                end: j2,
                rows: grid.rows,
            });
        };
        grid.check_len()?;
        Ok(Cells { columns, rows })
    }

    /// Returns `(tail, head)` of the arrow for sample `(h, v)` at cell `(i, j)`.
    fn arrow(&self, i: usize, j: usize, (h, v): (f64, f64), scale: f64) -> (Point, Point) {
        let center = Point::new(i as f64 + 0.5, j as f64 + 0.5);
        let offset = Vec2::new(h * scale, v * scale);
        match self.order {
            TransformOrder::Endpoints => {
                let (tail, head) = self.anchor.place(center, offset);
                (self.affine * tail, self.affine * head)
            }
            TransformOrder::CellCenter => self.anchor.place(self.affine * center, offset),
        }
    }

    fn is_blank(&self, (h, v): (f64, f64)) -> bool {
        h == self.blank && v == self.blank
    }
}

/// Validated index ranges.
#[derive(Clone, Debug)]
struct Cells {
    columns: RangeInclusive<usize>,
    rows: RangeInclusive<usize>,
}

impl Cells {
    fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .clone()
            .flat_map(move |j| self.columns.clone().map(move |i| (i, j)))
    }
}

fn index_range(start: isize, end: isize, len: usize) -> Option<RangeInclusive<usize>> {
    let start = usize::try_from(start).ok()?;
    let end = usize::try_from(end).ok()?;
    (start <= end && end < len).then_some(start..=end)
}

/// The result of a successful [`render`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderOutcome {
    /// The device was not ready; nothing happened.
    NotReady,
    /// Auto scaling found no non-zero sample; nothing was drawn.
    EmptyField,
    /// Arrows were drawn.
    Drawn {
        /// Number of arrows drawn.
        arrows: usize,
        /// The scale factor that was applied.
        scale: f64,
    },
}

/// Draws one arrow per non-blank sample of `grid` inside `spec`'s ranges.
///
/// All arrows are drawn inside one [`BufferScope`], so a caller holding its
/// own buffer decides when they are flushed. Invalid ranges are reported
/// through [`Device::report_error`] and nothing is drawn.
///
/// A cell is skipped only when both components equal the blank sentinel; a
/// cell with one blank component is drawn using the sentinel as its value.
pub fn render<D: Device + ?Sized>(
    device: &mut D,
    grid: &VectorGrid<'_>,
    spec: &VectorFieldSpec,
) -> Result<RenderOutcome, VectorFieldError> {
    if !device.is_ready(CALLER) {
        return Ok(RenderOutcome::NotReady);
    }
    let cells = spec
        .cells(grid)
        .inspect_err(|err| device.report_error(CALLER, &err.to_string()))?;

    let scale = match spec.scale {
        ArrowScale::Fixed(scale) if scale.abs() >= f64::MIN_POSITIVE => scale,
        ArrowScale::Fixed(_) | ArrowScale::Auto => match derive_scale(grid, spec, &cells) {
            Some(scale) => scale,
            None => {
                log::debug!("{CALLER}: no non-zero samples, nothing to draw");
                return Ok(RenderOutcome::EmptyField);
            }
        },
    };

    let mut device = BufferScope::open(device);
    let mut arrows = 0;
    for (i, j) in cells.iter() {
        let sample = grid.sample(i, j);
        if spec.is_blank(sample) {
            continue;
        }
        let (tail, head) = spec.arrow(i, j, sample, scale);
        device.draw_arrow(tail, head);
        arrows += 1;
    }
    log::debug!("{CALLER}: drew {arrows} arrows at scale {scale}");
    Ok(RenderOutcome::Drawn { arrows, scale })
}

/// Returns the factor [`ArrowScale::Auto`] would use, or `None` for an
/// all-blank or all-zero field.
pub fn auto_scale(
    grid: &VectorGrid<'_>,
    spec: &VectorFieldSpec,
) -> Result<Option<f64>, VectorFieldError> {
    let cells = spec.cells(grid)?;
    Ok(derive_scale(grid, spec, &cells))
}

fn derive_scale(grid: &VectorGrid<'_>, spec: &VectorFieldSpec, cells: &Cells) -> Option<f64> {
    // Unlike drawing, the search ignores a sample if either component is blank.
    let mut max = 0.0_f64;
    for (i, j) in cells.iter() {
        let (h, v) = grid.sample(i, j);
        if h != spec.blank && v != spec.blank {
            let magnitude = (h * h + v * v).sqrt();
            if magnitude > max {
                max = magnitude;
            }
        }
    }
    if max.abs() < f64::MIN_POSITIVE {
        return None;
    }

    let [a, b, c, d, _, _] = spec.affine.as_coeffs();
    let dx2 = a * a + b * b;
    let dy2 = c * c + d * d;
    let tighter = if dx2 < dy2 { dx2 } else { dy2 };
    let scale = tighter.sqrt() / max;
    log::debug!("{CALLER}: auto scale {scale} from max magnitude {max}");
    Some(scale)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use quiver_device::{RecordingDevice, Severity};

    use super::*;

    fn assert_point_close(a: Point, b: Point) {
        let eps = 1e-9;
        assert!((a.x - b.x).abs() <= eps, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() <= eps, "{a:?} != {b:?}");
    }

    fn uniform(columns: usize, rows: usize, h: f64, v: f64) -> (Vec<f64>, Vec<f64>) {
        (vec![h; columns * rows], vec![v; columns * rows])
    }

    #[test]
    fn auto_scale_scenario_points_at_cell() {
        let horizontal = [3.0, 0.0];
        let vertical = [4.0, 0.0];
        let grid = VectorGrid::new(&horizontal, &vertical, 2, 1);
        let spec = VectorFieldSpec::covering(&grid).with_anchor(ArrowAnchor::TailAtPoint);

        let mut device = RecordingDevice::new();
        let outcome = render(&mut device, &grid, &spec).unwrap();

        let RenderOutcome::Drawn { arrows, scale } = outcome else {
            panic!("expected arrows, got {outcome:?}");
        };
        assert_eq!(arrows, 1);
        assert!((scale - 0.2).abs() < 1e-12);
        let arrow = device.arrows()[0];
        assert_point_close(arrow.to, Point::new(0.5, 0.5));
        assert_point_close(arrow.from, Point::new(-0.1, -0.3));
    }

    #[test]
    fn empty_field_draws_nothing_and_never_buffers() {
        let horizontal = [0.0, 0.0, 9.0, 0.0];
        let vertical = [0.0, 0.0, 9.0, 0.0];
        let grid = VectorGrid::new(&horizontal, &vertical, 2, 2);
        // The only non-zero sample uses the blank value, so it is blank.
        let spec = VectorFieldSpec::covering(&grid).with_blank(9.0);

        let mut device = RecordingDevice::new();
        assert_eq!(
            render(&mut device, &grid, &spec),
            Ok(RenderOutcome::EmptyField)
        );
        assert!(device.arrows().is_empty());
        assert!(device.buffer_counts().is_untouched());
    }

    #[test]
    fn fixed_scale_lengths_are_position_independent() {
        let (horizontal, vertical) = uniform(4, 3, 1.5, -2.0);
        let grid = VectorGrid::new(&horizontal, &vertical, 4, 3);
        let spec = VectorFieldSpec::covering(&grid)
            .with_scale(ArrowScale::Fixed(0.4))
            .with_blank(f64::NAN);

        let mut device = RecordingDevice::new();
        render(&mut device, &grid, &spec).unwrap();

        assert_eq!(device.arrows().len(), 12);
        for arrow in device.arrows() {
            assert!((arrow.vector().hypot() - 0.4 * 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn anchors_place_cell_center() {
        let (horizontal, vertical) = uniform(3, 2, 0.7, 0.3);
        let grid = VectorGrid::new(&horizontal, &vertical, 3, 2);
        for anchor in [
            ArrowAnchor::TailAtPoint,
            ArrowAnchor::Centered,
            ArrowAnchor::HeadAtPoint,
        ] {
            let spec = VectorFieldSpec::covering(&grid)
                .with_scale(ArrowScale::Fixed(1.0))
                .with_anchor(anchor);
            let mut device = RecordingDevice::new();
            render(&mut device, &grid, &spec).unwrap();

            let centers = (0..2).flat_map(|j| (0..3).map(move |i| (i, j)));
            for (arrow, (i, j)) in device.arrows().iter().zip(centers) {
                let center = Point::new(f64::from(i) + 0.5, f64::from(j) + 0.5);
                let anchored = match anchor {
                    ArrowAnchor::TailAtPoint => arrow.to,
                    ArrowAnchor::Centered => arrow.midpoint(),
                    ArrowAnchor::HeadAtPoint => arrow.from,
                };
                assert_point_close(anchored, center);
            }
        }
    }

    #[test]
    fn bad_ranges_report_and_draw_nothing() {
        let (horizontal, vertical) = uniform(3, 2, 1.0, 1.0);
        let grid = VectorGrid::new(&horizontal, &vertical, 3, 2);
        let cases = [
            (VectorFieldSpec::new(-1..=2, 0..=1), "horizontal"),
            (VectorFieldSpec::new(0..=3, 0..=1), "horizontal"),
            (VectorFieldSpec::new(2..=1, 0..=1), "horizontal"),
            (VectorFieldSpec::new(0..=2, 0..=2), "vertical"),
            (VectorFieldSpec::new(0..=2, -1..=0), "vertical"),
        ];
        for (spec, axis) in cases {
            let mut device = RecordingDevice::new();
            let err = render(&mut device, &grid, &spec).unwrap_err();
            assert!(device.arrows().is_empty());
            assert!(device.buffer_counts().is_untouched());
            let [diagnostic] = device.diagnostics() else {
                panic!("expected one diagnostic, got {:?}", device.diagnostics());
            };
            assert_eq!(diagnostic.severity, Severity::Error);
            assert_eq!(diagnostic.caller, CALLER);
            assert_eq!(
                diagnostic.message,
                std::format!("invalid index range for {axis} values")
            );
            assert_eq!(err.to_string(), diagnostic.message);
        }
    }

    #[test]
    fn short_grid_is_rejected() {
        let horizontal = [1.0; 5];
        let vertical = [1.0; 6];
        let grid = VectorGrid::new(&horizontal, &vertical, 3, 2);
        let mut device = RecordingDevice::new();
        let err = render(&mut device, &grid, &VectorFieldSpec::covering(&grid)).unwrap_err();
        assert_eq!(err, VectorFieldError::ShortGrid { len: 5, expected: 6 });
        assert!(device.arrows().is_empty());
    }

    #[test]
    fn half_blank_cells_are_drawn_but_not_searched() {
        let horizontal = [-1.0, 6.0];
        let vertical = [2.0, -1.0];
        let grid = VectorGrid::new(&horizontal, &vertical, 2, 1);
        let spec = VectorFieldSpec::covering(&grid).with_blank(-1.0);

        // Both cells have one blank component, so the auto search finds nothing.
        assert_eq!(auto_scale(&grid, &spec), Ok(None));

        let spec = spec.with_scale(ArrowScale::Fixed(1.0));
        let mut device = RecordingDevice::new();
        render(&mut device, &grid, &spec).unwrap();
        assert_eq!(device.arrows().len(), 2);
        assert_point_close(device.arrows()[0].to, Point::new(-0.5, 2.5));
    }

    #[test]
    fn auto_scale_uses_tighter_axis() {
        let horizontal = [1.0];
        let vertical = [0.0];
        let grid = VectorGrid::new(&horizontal, &vertical, 1, 1);
        let spec = VectorFieldSpec::covering(&grid)
            .with_blank(f64::NAN)
            .with_affine(Affine::scale_non_uniform(4.0, 2.0));
        assert_eq!(auto_scale(&grid, &spec), Ok(Some(2.0)));
    }

    #[test]
    fn transform_orders_differ_under_shear() {
        let horizontal = [1.0];
        let vertical = [0.0];
        let grid = VectorGrid::new(&horizontal, &vertical, 1, 1);
        let affine = Affine::new([2.0, 1.0, 0.0, 1.0, 10.0, 20.0]);
        let spec = VectorFieldSpec::covering(&grid)
            .with_blank(f64::NAN)
            .with_scale(ArrowScale::Fixed(1.0))
            .with_affine(affine);

        let mut device = RecordingDevice::new();
        render(&mut device, &grid, &spec).unwrap();
        let transformed = device.take_arrows()[0];
        assert_point_close(transformed.from, affine * Point::new(0.5, 0.5));
        assert!((transformed.vector() - Vec2::new(2.0, 1.0)).hypot() < 1e-12);

        let spec = spec.with_transform_order(TransformOrder::CellCenter);
        render(&mut device, &grid, &spec).unwrap();
        let kept = device.arrows()[0];
        assert_point_close(kept.from, affine * Point::new(0.5, 0.5));
        assert!((kept.vector() - Vec2::new(1.0, 0.0)).hypot() < 1e-12);
    }

    #[test]
    fn nested_render_does_not_flush_callers_buffer() {
        let (horizontal, vertical) = uniform(2, 2, 1.0, 0.0);
        let grid = VectorGrid::new(&horizontal, &vertical, 2, 2);
        let spec = VectorFieldSpec::covering(&grid);

        let mut device = RecordingDevice::new();
        device.begin_buffer();
        render(&mut device, &grid, &spec).unwrap();
        assert_eq!(device.buffer_depth(), 1);
        assert_eq!(device.buffer_counts().flushes, 0);
        assert!(device.arrows().iter().all(|a| a.buffered));

        device.end_buffer();
        render(&mut device, &grid, &spec).unwrap();
        let counts = device.buffer_counts();
        assert_eq!((counts.begins, counts.ends, counts.flushes), (2, 2, 1));
    }

    #[test]
    fn not_ready_is_a_silent_no_op() {
        let (horizontal, vertical) = uniform(2, 2, 1.0, 0.0);
        let grid = VectorGrid::new(&horizontal, &vertical, 2, 2);
        let mut device = RecordingDevice::new();
        device.set_ready(false);
        // Even an invalid range is not reported when nothing is open.
        let spec = VectorFieldSpec::new(0..=5, 0..=1);
        assert_eq!(render(&mut device, &grid, &spec), Ok(RenderOutcome::NotReady));
        assert!(device.diagnostics().is_empty());
        assert!(device.buffer_counts().is_untouched());
    }

    #[test]
    fn zero_fixed_scale_falls_back_to_auto() {
        let horizontal = [3.0, 0.0];
        let vertical = [4.0, 0.0];
        let grid = VectorGrid::new(&horizontal, &vertical, 2, 1);
        let spec = VectorFieldSpec::covering(&grid).with_scale(ArrowScale::Fixed(0.0));

        let mut device = RecordingDevice::new();
        let outcome = render(&mut device, &grid, &spec).unwrap();
        let RenderOutcome::Drawn { arrows, scale } = outcome else {
            panic!("expected arrows, got {outcome:?}");
        };
        assert_eq!(arrows, 1);
        assert!((scale - 0.2).abs() < 1e-12);
        assert!((device.arrows()[0].vector().hypot() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn legacy_selectors() {
        assert_eq!(ArrowAnchor::from_position(-3), ArrowAnchor::TailAtPoint);
        assert_eq!(ArrowAnchor::from_position(0), ArrowAnchor::Centered);
        assert_eq!(ArrowAnchor::from_position(1), ArrowAnchor::HeadAtPoint);
        assert_eq!(ArrowScale::from_factor(0.0), ArrowScale::Auto);
        assert_eq!(ArrowScale::from_factor(-0.5), ArrowScale::Fixed(-0.5));
    }
}
