// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG output for `quiver_demo`. All coordinates are device units.

use std::fmt::Write as _;

use kurbo::{BezPath, Point, Rect, Size};
use peniko::Color;
use quiver_text::{SCRIPT_RAISE, ScriptToken, ScriptTokens, script_factor};

/// Arrowhead length as a fraction of the shaft.
const HEAD_FRACTION: f64 = 0.3;

#[derive(Debug)]
enum Item {
    Arrow {
        from: Point,
        to: Point,
        stroke: Color,
    },
    Outline {
        corners: [Point; 4],
        stroke: Color,
    },
    Frame {
        rect: Rect,
        stroke: Color,
    },
    Label {
        anchor: Point,
        angle: f64,
        justification: f64,
        font_size: f64,
        text: String,
        fill: Color,
    },
}

#[derive(Debug)]
pub(crate) struct SvgScene {
    size: Size,
    items: Vec<Item>,
}

impl SvgScene {
    pub(crate) fn new(size: Size) -> Self {
        Self {
            size,
            items: Vec::new(),
        }
    }

    pub(crate) fn arrow(&mut self, from: Point, to: Point, stroke: Color) {
        self.items.push(Item::Arrow { from, to, stroke });
    }

    pub(crate) fn outline(&mut self, corners: [Point; 4], stroke: Color) {
        self.items.push(Item::Outline { corners, stroke });
    }

    pub(crate) fn frame(&mut self, rect: Rect, stroke: Color) {
        self.items.push(Item::Frame { rect, stroke });
    }

    pub(crate) fn label(
        &mut self,
        anchor: Point,
        angle: f64,
        justification: f64,
        font_size: f64,
        text: &str,
        fill: Color,
    ) {
        self.items.push(Item::Label {
            anchor,
            angle,
            justification,
            font_size,
            text: text.to_string(),
            fill,
        });
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            w = self.size.width,
            h = self.size.height,
        );
        for item in &self.items {
            match item {
                Item::Arrow { from, to, stroke } => {
                    let d = arrow_path(*from, *to).to_svg();
                    let _ = writeln!(
                        out,
                        r#"<path d="{d}" fill="none" stroke="{}" stroke-width="1"/>"#,
                        hex(*stroke)
                    );
                }
                Item::Outline { corners, stroke } => {
                    let mut p = BezPath::new();
                    p.move_to(corners[0]);
                    for &c in &corners[1..] {
                        p.line_to(c);
                    }
                    p.close_path();
                    let _ = writeln!(
                        out,
                        r#"<path d="{}" fill="none" stroke="{}" stroke-dasharray="2 2"/>"#,
                        p.to_svg(),
                        hex(*stroke)
                    );
                }
                Item::Frame { rect, stroke } => {
                    let _ = writeln!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}"/>"#,
                        rect.x0,
                        rect.y0,
                        rect.width(),
                        rect.height(),
                        hex(*stroke)
                    );
                }
                Item::Label {
                    anchor,
                    angle,
                    justification,
                    font_size,
                    text,
                    fill,
                } => write_label(&mut out, *anchor, *angle, *justification, *font_size, text, *fill),
            }
        }
        out.push_str("</svg>\n");
        out
    }
}

fn arrow_path(from: Point, to: Point) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(from);
    p.line_to(to);
    let shaft = to - from;
    let length = shaft.hypot();
    if length > 1e-9 {
        let back = -shaft * HEAD_FRACTION;
        let wing = back.turn_90() * 0.5;
        p.move_to(to + back + wing);
        p.line_to(to);
        p.line_to(to + back - wing);
    }
    p
}

fn write_label(
    out: &mut String,
    anchor: Point,
    angle: f64,
    justification: f64,
    font_size: f64,
    text: &str,
    fill: Color,
) {
    let text_anchor = if justification <= 0.25 {
        "start"
    } else if justification >= 0.75 {
        "end"
    } else {
        "middle"
    };
    // Device y grows downward, so a counter-clockwise angle is a negative SVG rotation.
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" font-size="{font_size}" text-anchor="{text_anchor}" fill="{}" transform="rotate({} {x} {y})">"#,
        hex(fill),
        -angle,
        x = anchor.x,
        y = anchor.y,
    );
    let mut level = 0_i32;
    for token in ScriptTokens::new(text) {
        match token {
            ScriptToken::Up => level += 1,
            ScriptToken::Down => level -= 1,
            ScriptToken::Text(run) => {
                let _ = write!(
                    out,
                    r#"<tspan font-size="{}" baseline-shift="{}">{}</tspan>"#,
                    font_size * script_factor(level),
                    f64::from(level) * SCRIPT_RAISE * font_size,
                    escape_xml(run)
                );
            }
        }
    }
    out.push_str("</text>\n");
}

fn hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
