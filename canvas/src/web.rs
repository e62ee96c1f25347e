//! Raster backend: the browser's `CanvasRenderingContext2d`.
//!
//! This is the only module besides [`crate::engine::Engine`] that touches
//! `web-sys` drawing APIs. Style and transform state are mirrored in a
//! [`StateStack`] so [`Surface::state`] and the frame-balance check behave
//! exactly as they do on the SVG backend.
//!
//! The handful of canvas calls that return `Result<(), JsValue>` are routed
//! through [`check`], which logs the failure and carries on. A drawing
//! program never sees a browser exception.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::surface::{DrawState, StateStack, Surface, TextAlign, Transform, all_finite, normalize_dash};

/// Log a failed canvas call.
fn check(result: Result<(), JsValue>, what: &str) {
    if let Err(err) = result {
        log::warn!("canvas {what} failed: {err:?}");
    }
}

/// Look up the 2D context of a canvas element.
///
/// # Errors
///
/// Returns `Err` if the browser refuses a 2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// PNG data URL of the canvas backing buffer.
///
/// # Errors
///
/// Returns `Err` if the canvas is tainted or the encode fails.
pub fn png_data_url(canvas: &HtmlCanvasElement) -> Result<String, JsValue> {
    canvas.to_data_url_with_type("image/png")
}

/// A [`Surface`] drawing into a live canvas.
pub struct WebSurface {
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    stack: StateStack,
}

impl WebSurface {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d, dpr: f64) -> Self {
        let mut surface = Self { ctx, dpr, stack: StateStack::new() };
        surface.reset();
        surface
    }

    /// Wrap the 2D context of `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the browser refuses a 2D context.
    pub fn from_canvas(canvas: &HtmlCanvasElement, dpr: f64) -> Result<Self, JsValue> {
        Ok(Self::new(context_2d(canvas)?, dpr))
    }

    /// Change the device pixel ratio used by [`Surface::reset`].
    pub fn set_dpr(&mut self, dpr: f64) {
        self.dpr = dpr;
    }

    /// Push the mirrored style of `state` to the context.
    fn apply_style(&self, state: &DrawState) {
        self.ctx.set_stroke_style_str(&state.stroke_style);
        self.ctx.set_fill_style_str(&state.fill_style);
        self.ctx.set_line_width(state.line_width);
        self.ctx.set_font(&state.font);
        self.ctx.set_text_align(state.text_align.as_str());
        self.push_dash(&state.line_dash);
    }

    fn push_dash(&self, dash: &[f64]) {
        let segments: js_sys::Array = dash.iter().map(|d| JsValue::from_f64(*d)).collect();
        check(self.ctx.set_line_dash(&segments), "setLineDash");
    }
}

impl Surface for WebSurface {
    fn state(&self) -> &DrawState {
        self.stack.current()
    }

    fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn reset(&mut self) {
        for _ in 0..self.stack.depth() {
            self.ctx.restore();
        }
        self.stack.reset();
        check(self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0), "setTransform");
        self.apply_style(self.stack.current());
        self.ctx.begin_path();
    }

    fn save(&mut self) {
        self.stack.save();
        self.ctx.save();
    }

    fn restore(&mut self) {
        // An unmatched restore is a no-op on both sides.
        if self.stack.restore() {
            self.ctx.restore();
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        if self.stack.push_transform(Transform::Translate(x, y)) {
            check(self.ctx.translate(x, y), "translate");
        }
    }

    fn rotate(&mut self, angle: f64) {
        if self.stack.push_transform(Transform::Rotate(angle)) {
            check(self.ctx.rotate(angle), "rotate");
        }
    }

    fn scale(&mut self, x: f64, y: f64) {
        if self.stack.push_transform(Transform::Scale(x, y)) {
            check(self.ctx.scale(x, y), "scale");
        }
    }

    fn set_stroke_style(&mut self, color: &str) {
        color.clone_into(&mut self.stack.current_mut().stroke_style);
        self.ctx.set_stroke_style_str(color);
    }

    fn set_fill_style(&mut self, color: &str) {
        color.clone_into(&mut self.stack.current_mut().fill_style);
        self.ctx.set_fill_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.stack.current_mut().line_width = width;
            self.ctx.set_line_width(width);
        }
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        if let Some(dash) = normalize_dash(segments) {
            self.push_dash(&dash);
            self.stack.current_mut().line_dash = dash;
        }
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.stack.current_mut().font);
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.stack.current_mut().text_align = align;
        self.ctx.set_text_align(align.as_str());
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) {
        if !all_finite(&[x, y, radius, start, end]) {
            return;
        }
        check(self.ctx.arc_with_anticlockwise(x, y, radius, start, end, counterclockwise), "arc");
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.rect(x, y, w, h);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        check(self.ctx.fill_text(text, x, y), "fillText");
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.clear_rect(x, y, w, h);
    }

    fn clip(&mut self) {
        self.ctx.clip();
    }
}
