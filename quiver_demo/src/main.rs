// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders a vortex field with labelled text boxes to an SVG file.
//!
//! Usage: `quiver_demo [OUTPUT]` (defaults to `quiver_demo.svg`). Set
//! `RUST_LOG=debug` to see the derived arrow scale.

mod logging;
mod svg;

use kurbo::{Point, Rect};
use peniko::color::palette::css;
use quiver_device::{Device, DeviceInfo, RecordingDevice, TransformSpace};
use quiver_plot::{
    ArrowAnchor, RenderOutcome, TextQuery, Units, VectorFieldSpec, VectorGrid, render, text_box,
    text_extent,
};
use quiver_text::TextMeasurer;

use crate::logging::{LoggingConfig, init_logging};
use crate::svg::SvgScene;

const COLUMNS: usize = 20;
const ROWS: usize = 15;
const BLANK: f64 = -999.0;

struct Label {
    anchor: Point,
    angle: f64,
    justification: f64,
    text: &'static str,
}

const LABELS: [Label; 3] = [
    Label {
        anchor: Point::new(10.0, 15.6),
        angle: 0.0,
        justification: 0.5,
        text: "Vortex flow",
    },
    Label {
        anchor: Point::new(-1.0, 7.5),
        angle: 90.0,
        justification: 0.5,
        text: r"y (10\u3\d m)",
    },
    Label {
        anchor: Point::new(20.0, -1.2),
        angle: 0.0,
        justification: 1.0,
        text: "x (km)",
    },
];

fn demo_measurer() -> Box<dyn TextMeasurer> {
    #[cfg(feature = "parley")]
    {
        Box::new(quiver_text_parley::ParleyTextMeasurer::new())
    }
    #[cfg(not(feature = "parley"))]
    {
        Box::new(quiver_text::HeuristicTextMeasurer)
    }
}

/// A solid-body vortex around the grid center, with the core left blank.
fn vortex() -> (Vec<f64>, Vec<f64>) {
    let (cx, cy) = (COLUMNS as f64 / 2.0, ROWS as f64 / 2.0);
    let mut horizontal = Vec::with_capacity(COLUMNS * ROWS);
    let mut vertical = Vec::with_capacity(COLUMNS * ROWS);
    for j in 0..ROWS {
        for i in 0..COLUMNS {
            let (dx, dy) = (i as f64 + 0.5 - cx, j as f64 + 0.5 - cy);
            if dx.hypot(dy) < 1.0 {
                horizontal.push(BLANK);
                vertical.push(BLANK);
            } else {
                horizontal.push(-dy);
                vertical.push(dx);
            }
        }
    }
    (horizontal, vertical)
}

fn main() -> std::io::Result<()> {
    init_logging(LoggingConfig::default());
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "quiver_demo.svg".to_string());

    let info = DeviceInfo::points(640.0, 480.0);
    let viewport = Rect::new(0.12, 0.1, 0.95, 0.88);
    let mut device = RecordingDevice::with_measurer(demo_measurer())
        .with_info(info)
        .with_viewport(viewport)
        .with_window(Rect::new(0.0, 0.0, COLUMNS as f64, ROWS as f64));

    let (horizontal, vertical) = vortex();
    let grid = VectorGrid::new(&horizontal, &vertical, COLUMNS, ROWS);
    let spec = VectorFieldSpec::covering(&grid)
        .with_anchor(ArrowAnchor::Centered)
        .with_blank(BLANK);

    match render(&mut device, &grid, &spec) {
        Ok(RenderOutcome::Drawn { arrows, scale }) => {
            log::info!("drew {arrows} arrows at scale {scale:.4}");
        }
        Ok(outcome) => log::warn!("nothing drawn: {outcome:?}"),
        Err(err) => log::error!("vector field rejected: {err}"),
    }

    let mut scene = SvgScene::new(kurbo::Size::new(info.width, info.height));
    let to_device = device.space_to_device(TransformSpace::Normalized);
    scene.frame(to_device.transform_rect_bbox(viewport), css::GRAY);
    for arrow in device.take_arrows() {
        let to_device = device.space_to_device(arrow.space);
        scene.arrow(to_device * arrow.from, to_device * arrow.to, css::STEEL_BLUE);
    }

    let world_to_device = device.space_to_device(TransformSpace::World);
    for label in &LABELS {
        let query = TextQuery::new(label.anchor, label.text)
            .with_angle(label.angle)
            .with_justification(label.justification);
        let Some(b) = text_box(&mut device, &query) else {
            continue;
        };
        scene.outline(b.corners.map(|p| world_to_device * p), css::CRIMSON);
        scene.label(
            world_to_device * label.anchor,
            label.angle,
            label.justification,
            device.font_size(),
            label.text,
            css::BLACK,
        );

        let mm = text_extent(&mut device, label.text, Units::Millimeters);
        log::info!(
            "{:?}: {:.1} x {:.1} (mm units)",
            label.text,
            mm.width,
            mm.height
        );
    }

    debug_assert!(!device.is_buffering(), "demo leaves no buffer open");
    std::fs::write(&path, scene.to_svg_string())?;
    log::info!("wrote {path}");
    Ok(())
}
