//! Hit-testing registry for shapes a drawing program marks as interactive.
//!
//! Shapes are registered while a canvas frame runs. The registry keeps two
//! buffers: the frame being built and the last completed frame. Pointer
//! queries only ever see the completed frame, so a half-drawn or failed frame
//! never becomes queryable.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_POINT_RADIUS, HIT_TOLERANCE_PX};
use crate::viewport::Point;

/// Geometry of an interactive shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    /// A marked point; `r` of zero means the default radius.
    Point { r: f64 },
    Circle { r: f64 },
    /// Axis-aligned rectangle anchored at the shape position.
    Rect { w: f64, h: f64 },
}

impl ShapeKind {
    fn radius(r: f64) -> f64 {
        if r.is_finite() && r > 0.0 { r } else { DEFAULT_POINT_RADIUS }
    }
}

/// A shape registered by the drawing program during one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveShape {
    pub id: String,
    #[serde(flatten)]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub info: String,
}

impl InteractiveShape {
    /// Whether the logical point lies within this shape.
    ///
    /// Points and circles match within their radius plus the hit tolerance.
    /// Rectangles match inclusively on their edges; negative extents are
    /// normalised and a zero width or height never matches.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        match self.kind {
            ShapeKind::Point { r } | ShapeKind::Circle { r } => {
                (pt.x - self.x).hypot(pt.y - self.y) <= ShapeKind::radius(r) + HIT_TOLERANCE_PX
            }
            ShapeKind::Rect { w, h } => {
                if w == 0.0 || h == 0.0 || !w.is_finite() || !h.is_finite() {
                    return false;
                }
                let (x0, x1) = ordered(self.x, self.x + w);
                let (y0, y1) = ordered(self.y, self.y + h);
                pt.x >= x0 && pt.x <= x1 && pt.y >= y0 && pt.y <= y1
            }
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Double-buffered per-frame shape registry.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    building: Vec<InteractiveShape>,
    published: Vec<InteractiveShape>,
}

impl ShapeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a new frame. Anything registered so far is dropped.
    pub fn begin_frame(&mut self) {
        self.building.clear();
    }

    /// Append a shape to the frame being built.
    pub fn register(&mut self, shape: InteractiveShape) {
        self.building.push(shape);
    }

    /// Make the built frame queryable.
    pub fn publish(&mut self) {
        self.published = std::mem::take(&mut self.building);
    }

    /// Drop the built frame and clear the queryable one.
    pub fn discard(&mut self) {
        self.building.clear();
        self.published.clear();
    }

    /// Topmost published shape at `pt`, scanning in reverse registration order.
    #[must_use]
    pub fn resolve(&self, pt: Point) -> Option<&InteractiveShape> {
        self.published.iter().rev().find(|shape| shape.contains(pt))
    }

    /// Shapes of the last completed frame, in registration order.
    #[must_use]
    pub fn shapes(&self) -> &[InteractiveShape] {
        &self.published
    }
}
