//! Test-only surface that records every call.

use super::*;

/// In-memory stand-in for the raster backend.
///
/// Each call is appended to `calls` in a compact `name(args)` form, numbers
/// printed with two decimals. State tracking goes through the same
/// [`StateStack`] the real backends use.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<String>,
    stack: StateStack,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any recorded call starts with `prefix`.
    #[must_use]
    pub fn has_call(&self, prefix: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of calls starting with `prefix`.
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn log(&mut self, name: &str, args: &[f64]) {
        let args = args
            .iter()
            .map(|a| format!("{a:.2}"))
            .collect::<Vec<_>>()
            .join(",");
        self.calls.push(format!("{name}({args})"));
    }
}

impl Surface for RecordingSurface {
    fn state(&self) -> &DrawState {
        self.stack.current()
    }

    fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn reset(&mut self) {
        self.stack.reset();
        self.calls.push("reset()".to_owned());
    }

    fn save(&mut self) {
        self.stack.save();
        self.log("save", &[]);
    }

    fn restore(&mut self) {
        self.stack.restore();
        self.log("restore", &[]);
    }

    fn translate(&mut self, x: f64, y: f64) {
        if self.stack.push_transform(Transform::Translate(x, y)) {
            self.log("translate", &[x, y]);
        }
    }

    fn rotate(&mut self, angle: f64) {
        if self.stack.push_transform(Transform::Rotate(angle)) {
            self.log("rotate", &[angle]);
        }
    }

    fn scale(&mut self, x: f64, y: f64) {
        if self.stack.push_transform(Transform::Scale(x, y)) {
            self.log("scale", &[x, y]);
        }
    }

    fn set_stroke_style(&mut self, color: &str) {
        color.clone_into(&mut self.stack.current_mut().stroke_style);
        self.calls.push(format!("strokeStyle={color}"));
    }

    fn set_fill_style(&mut self, color: &str) {
        color.clone_into(&mut self.stack.current_mut().fill_style);
        self.calls.push(format!("fillStyle={color}"));
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.stack.current_mut().line_width = width;
        }
        self.log("lineWidth", &[width]);
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        if let Some(dash) = normalize_dash(segments) {
            self.stack.current_mut().line_dash = dash;
        }
        self.log("setLineDash", segments);
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.stack.current_mut().font);
        self.calls.push(format!("font={font}"));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.stack.current_mut().text_align = align;
        self.calls.push(format!("textAlign={}", align.as_str()));
    }

    fn begin_path(&mut self) {
        self.log("beginPath", &[]);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.log("moveTo", &[x, y]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.log("lineTo", &[x, y]);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) {
        self.log("arc", &[x, y, radius, start, end, f64::from(u8::from(counterclockwise))]);
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.log("rect", &[x, y, w, h]);
    }

    fn close_path(&mut self) {
        self.log("closePath", &[]);
    }

    fn stroke(&mut self) {
        self.log("stroke", &[]);
    }

    fn fill(&mut self) {
        self.log("fill", &[]);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.calls.push(format!("fillText({text},{x:.2},{y:.2})"));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.log("fillRect", &[x, y, w, h]);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.log("strokeRect", &[x, y, w, h]);
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.log("clearRect", &[x, y, w, h]);
    }

    fn clip(&mut self) {
        self.log("clip", &[]);
    }
}
