// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by plotting operations.

/// Precondition violations rejected by [`render`](crate::render).
///
/// The `Display` text is what gets reported through the device.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VectorFieldError {
    /// The column range is empty, negative, or past the grid width.
    #[error("invalid index range for horizontal values")]
    InvalidColumnRange {
        /// First requested column.
        start: isize,
        /// Last requested column (inclusive).
        end: isize,
        /// Grid width.
        columns: usize,
    },
    /// The row range is empty, negative, or past the grid height.
    #[error("invalid index range for vertical values")]
    InvalidRowRange {
        /// First requested row.
        start: isize,
        /// Last requested row (inclusive).
        end: isize,
        /// Grid height.
        rows: usize,
    },
    /// A component slice is shorter than `columns * rows`.
    #[error("vector grid holds {len} samples, expected {expected}")]
    ShortGrid {
        /// Length of the shorter component slice.
        len: usize,
        /// Samples required by the grid dimensions.
        expected: usize,
    },
}

/// A legacy integer unit selector that names no [`Units`](crate::Units).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid units code {0}")]
pub struct UnitsError(pub i32);
