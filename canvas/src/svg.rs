//! SVG backend: records paint operations as SVG elements.
//!
//! Used for vector export. The export always shows the settled figure, so
//! `clip` and `clear_rect` do nothing here. Transforms are not applied to
//! coordinates; instead each element painted under a non-empty transform chain
//! is wrapped in `<g transform="...">`, with rotations converted to degrees.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use std::f64::consts::{PI, TAU};

use crate::consts::{DEFAULT_SVG_FONT_SIZE, FULL_CIRCLE_EPSILON};
use crate::surface::{DrawState, StateStack, Surface, TextAlign, Transform, all_finite, normalize_dash};

const STYLE_BLOCK: &str = "<defs><style>\
.geo-text { font-family: 'Inter', sans-serif; font-weight: 600; }\
.geo-line { stroke-linecap: round; stroke-linejoin: round; vector-effect: non-scaling-stroke; }\
.geo-shape { transition: fill 0.3s; }\
</style></defs>";

/// A piece of the path under construction.
#[derive(Debug, Clone, PartialEq)]
enum PathPart {
    Command(String),
    Circle { cx: f64, cy: f64, r: f64 },
}

/// Surface that accumulates an SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    background: String,
    elements: Vec<String>,
    path: Vec<PathPart>,
    stack: StateStack,
}

impl SvgSurface {
    /// Start a document of `width` × `height` logical pixels on a solid background.
    #[must_use]
    pub fn new(width: f64, height: f64, background: &str) -> Self {
        Self {
            width,
            height,
            background: background.to_owned(),
            elements: Vec::new(),
            path: Vec::new(),
            stack: StateStack::new(),
        }
    }

    /// Painted elements so far, excluding the background.
    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Render the self-contained SVG document.
    #[must_use]
    pub fn document(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut out = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#);
        out.push_str(STYLE_BLOCK);
        out.push_str(&format!(r#"<rect width="{w}" height="{h}" fill="{}" />"#, escape_xml(&self.background)));
        for el in &self.elements {
            out.push('\n');
            out.push_str(el);
        }
        out.push_str("</svg>");
        out
    }

    fn push_element(&mut self, content: String) {
        let transforms = &self.stack.current().transforms;
        if transforms.is_empty() {
            self.elements.push(content);
        } else {
            let chain = transform_attr(transforms);
            self.elements.push(format!(r#"<g transform="{chain}">{content}</g>"#));
        }
    }

    fn has_commands(&self) -> bool {
        self.path
            .iter()
            .any(|p| matches!(p, PathPart::Command(_)))
    }

    fn path_data(&self) -> String {
        self.path
            .iter()
            .filter_map(|p| match p {
                PathPart::Command(cmd) => Some(cmd.as_str()),
                PathPart::Circle { .. } => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn circles(&self) -> Vec<(f64, f64, f64)> {
        self.path
            .iter()
            .filter_map(|p| match p {
                PathPart::Circle { cx, cy, r } => Some((*cx, *cy, *r)),
                PathPart::Command(_) => None,
            })
            .collect()
    }

    fn rect_data(x: f64, y: f64, w: f64, h: f64) -> String {
        format!("M {x} {y} L {} {y} L {} {} L {x} {} Z", x + w, x + w, y + h, y + h)
    }

    fn stroke_attrs(state: &DrawState) -> String {
        let mut attrs = format!(
            r#"fill="none" stroke="{}" stroke-width="{}""#,
            escape_xml(&state.stroke_style),
            state.line_width
        );
        if !state.line_dash.is_empty() {
            let dash = state
                .line_dash
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            attrs.push_str(&format!(r#" stroke-dasharray="{dash}""#));
        }
        attrs
    }

    fn emit_stroked_path(&mut self, d: &str) {
        let attrs = Self::stroke_attrs(self.stack.current());
        self.push_element(format!(
            r#"<path d="{d}" {attrs} stroke-linecap="round" stroke-linejoin="round" class="geo-line" />"#
        ));
    }

    fn emit_filled_path(&mut self, d: &str) {
        let fill = escape_xml(&self.stack.current().fill_style);
        self.push_element(format!(r#"<path d="{d}" fill="{fill}" stroke="none" class="geo-shape" />"#));
    }
}

impl Surface for SvgSurface {
    fn state(&self) -> &DrawState {
        self.stack.current()
    }

    fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn reset(&mut self) {
        self.stack.reset();
        self.path.clear();
    }

    fn save(&mut self) {
        self.stack.save();
    }

    fn restore(&mut self) {
        self.stack.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.stack.push_transform(Transform::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.stack.push_transform(Transform::Rotate(angle));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.stack.push_transform(Transform::Scale(x, y));
    }

    fn set_stroke_style(&mut self, color: &str) {
        color.clone_into(&mut self.stack.current_mut().stroke_style);
    }

    fn set_fill_style(&mut self, color: &str) {
        color.clone_into(&mut self.stack.current_mut().fill_style);
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.stack.current_mut().line_width = width;
        }
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        if let Some(dash) = normalize_dash(segments) {
            self.stack.current_mut().line_dash = dash;
        }
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.stack.current_mut().font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.stack.current_mut().text_align = align;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        if all_finite(&[x, y]) {
            self.path.push(PathPart::Command(format!("M {x} {y}")));
        }
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if all_finite(&[x, y]) {
            self.path.push(PathPart::Command(format!("L {x} {y}")));
        }
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) {
        if !all_finite(&[x, y, radius, start, end]) || radius < 0.0 {
            return;
        }
        if (end - start).abs() >= TAU - FULL_CIRCLE_EPSILON {
            self.path.push(PathPart::Circle { cx: x, cy: y, r: radius });
            return;
        }

        let start_x = x + radius * start.cos();
        let start_y = y + radius * start.sin();
        let end_x = x + radius * end.cos();
        let end_y = y + radius * end.sin();
        let (large_arc, sweep) = arc_flags(start, end, counterclockwise);

        let lead = if self.has_commands() { "L" } else { "M" };
        self.path.push(PathPart::Command(format!("{lead} {start_x} {start_y}")));
        self.path.push(PathPart::Command(format!(
            "A {radius} {radius} 0 {large_arc} {sweep} {end_x} {end_y}"
        )));
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if all_finite(&[x, y, w, h]) {
            self.path.push(PathPart::Command(Self::rect_data(x, y, w, h)));
        }
    }

    fn close_path(&mut self) {
        if self.has_commands() {
            self.path.push(PathPart::Command("Z".to_owned()));
        }
    }

    fn stroke(&mut self) {
        if self.has_commands() {
            let d = self.path_data();
            self.emit_stroked_path(&d);
        }
        for (cx, cy, r) in self.circles() {
            let attrs = Self::stroke_attrs(self.stack.current());
            self.push_element(format!(r#"<circle cx="{cx}" cy="{cy}" r="{r}" {attrs} />"#));
        }
    }

    fn fill(&mut self) {
        if self.has_commands() {
            let d = self.path_data();
            self.emit_filled_path(&d);
        }
        for (cx, cy, r) in self.circles() {
            let fill = escape_xml(&self.stack.current().fill_style);
            self.push_element(format!(r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" stroke="none" />"#));
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if !all_finite(&[x, y]) {
            return;
        }
        let state = self.stack.current();
        let anchor = state.text_align.svg_anchor();
        let size = font_size_px(&state.font).unwrap_or(DEFAULT_SVG_FONT_SIZE);
        let fill = escape_xml(&state.fill_style);
        let content = format!(
            r#"<text x="{x}" y="{y}" fill="{fill}" font-family="Inter, sans-serif" font-size="{size}" text-anchor="{anchor}" class="geo-text">{}</text>"#,
            escape_xml(text)
        );
        self.push_element(content);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if all_finite(&[x, y, w, h]) {
            self.emit_filled_path(&Self::rect_data(x, y, w, h));
        }
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if all_finite(&[x, y, w, h]) {
            self.emit_stroked_path(&Self::rect_data(x, y, w, h));
        }
    }

    fn clear_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {}

    fn clip(&mut self) {}
}

/// Large-arc and sweep flags for a partial canvas arc.
///
/// The swept angle follows the canvas rule: clockwise arcs sweep
/// `end - start` wrapped into `[0, 2π)`, counter-clockwise arcs sweep
/// `start - end` wrapped the same way.
#[must_use]
pub fn arc_flags(start: f64, end: f64, counterclockwise: bool) -> (u8, u8) {
    let delta = if counterclockwise { start - end } else { end - start };
    let swept = delta.rem_euclid(TAU);
    let large_arc = u8::from(swept > PI);
    let sweep = u8::from(!counterclockwise);
    (large_arc, sweep)
}

/// Render a transform chain as an SVG `transform` attribute value.
#[must_use]
pub fn transform_attr(transforms: &[Transform]) -> String {
    transforms
        .iter()
        .map(|t| match *t {
            Transform::Translate(x, y) => format!("translate({x}, {y})"),
            Transform::Rotate(angle) => format!("rotate({})", angle.to_degrees()),
            Transform::Scale(x, y) => format!("scale({x}, {y})"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `<digits>px` token of a CSS font shorthand.
fn font_size_px(font: &str) -> Option<&str> {
    let bytes = font.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if font[i..].starts_with("px") {
                return Some(&font[start..i]);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Escape text for use in SVG content and attribute values.
#[must_use]
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
