// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotting primitives that reproduce drawing geometry exactly.
//!
//! - [`render`] draws a grid of vector samples as arrows, with automatic
//!   scaling, three anchoring policies, and an affine grid transform.
//! - [`text_box`] and [`text_extent`] report where a label would land and how
//!   large it is, using the same measurement pass as drawing but emitting
//!   nothing.
//!
//! Everything runs against a caller-supplied [`quiver_device::Device`]. Shared
//! device state (buffering, transform space, character height) is always
//! handed back as it was found.
//!
//! The `f64` implementation is the only one; [`render_f32`], [`text_box_f32`]
//! and [`text_extent_f32`] convert at the boundary.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
#[cfg(not(feature = "std"))]
mod float;
mod single;
mod text_query;
mod units;
mod vector;

pub use error::{UnitsError, VectorFieldError};
pub use single::{render_f32, text_box_f32, text_extent_f32};
pub use text_query::{TextBox, TextQuery, text_box, text_extent, text_extent_code};
pub use units::Units;
pub use vector::{
    ArrowAnchor, ArrowScale, RenderOutcome, TransformOrder, VectorFieldSpec, VectorGrid,
    auto_scale, render,
};
