#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// A point in logical (CSS pixel) or client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-page bounding box of the canvas element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Logical drawing size and device pixel ratio.
///
/// `width` / `height` are the logical (CSS pixel) coordinate space the
/// drawing program sees. The backing buffer is `round(logical × dpr)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

impl Viewport {
    /// Apply a container resize. Zero or non-finite sizes are ignored.
    ///
    /// Returns `true` when the viewport changed.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> bool {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return false;
        }
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let next = Self { width, height, dpr };
        let changed = next != *self;
        *self = next;
        changed
    }

    /// `true` once a non-zero size has been applied.
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Physical backing-buffer size in device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.width * self.dpr).round().max(0.0) as u32;
        let h = (self.height * self.dpr).round().max(0.0) as u32;
        (w, h)
    }

    /// Map a client-space pointer position to logical coordinates.
    ///
    /// The scale is logical size over the element's rendered size, which
    /// cancels both the device pixel ratio and any CSS stretching. Returns
    /// `None` when the element has no rendered area.
    #[must_use]
    pub fn client_to_logical(&self, client: Point, rect: ElementRect) -> Option<Point> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let scale_x = self.width / rect.width;
        let scale_y = self.height / rect.height;
        Some(Point {
            x: (client.x - rect.left) * scale_x,
            y: (client.y - rect.top) * scale_y,
        })
    }
}
