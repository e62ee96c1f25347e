//! Drawing-surface contract shared by the raster and vector backends.
//!
//! A drawing program only ever sees a `&mut dyn Surface`. The browser canvas
//! ([`crate::web::WebSurface`]) and the SVG builder ([`crate::svg::SvgSurface`])
//! implement the same method set, so one compiled program produces equivalent
//! raster and vector output.
//!
//! Style and transform state live in an explicit [`StateStack`] owned by each
//! backend. `save` pushes a copy of the current [`DrawState`], `restore` pops it.
//! The stack depth is observable so a frame that leaves saves unmatched can be
//! detected and unwound.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

#[cfg(test)]
#[path = "surface_helpers_test.rs"]
pub(crate) mod test_helpers;

/// Horizontal text alignment, mirroring the canvas `textAlign` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

impl TextAlign {
    /// Parse a canvas `textAlign` keyword. Unknown keywords yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }

    /// SVG `text-anchor` value for this alignment.
    #[must_use]
    pub fn svg_anchor(self) -> &'static str {
        match self {
            Self::Center => "middle",
            Self::Right | Self::End => "end",
            Self::Start | Self::Left => "start",
        }
    }
}

/// One entry of the accumulated transform chain. Rotation is in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
}

impl Transform {
    #[must_use]
    pub fn is_finite(self) -> bool {
        match self {
            Self::Translate(x, y) | Self::Scale(x, y) => all_finite(&[x, y]),
            Self::Rotate(angle) => angle.is_finite(),
        }
    }
}

/// Mutable per-surface style and transform state.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub stroke_style: String,
    pub fill_style: String,
    pub line_width: f64,
    pub line_dash: Vec<f64>,
    pub font: String,
    pub text_align: TextAlign,
    pub transforms: Vec<Transform>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            stroke_style: "#000000".to_owned(),
            fill_style: "#000000".to_owned(),
            line_width: 1.0,
            line_dash: Vec::new(),
            font: "10px sans-serif".to_owned(),
            text_align: TextAlign::Start,
            transforms: Vec::new(),
        }
    }
}

/// Explicit save/restore stack of [`DrawState`]s.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut DrawState {
        &mut self.current
    }

    /// Append `transform` to the current chain. Non-finite transforms are
    /// dropped, as the canvas does; returns whether it was kept.
    pub fn push_transform(&mut self, transform: Transform) -> bool {
        if !transform.is_finite() {
            return false;
        }
        self.current.transforms.push(transform);
        true
    }

    /// Push a copy of the current state.
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Pop the most recently saved state. Returns `false` on an empty stack.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    /// Number of unmatched saves.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drop every saved entry and return to the default state.
    pub fn reset(&mut self) {
        self.saved.clear();
        self.current = DrawState::default();
    }
}

/// Normalize a dash list the way the canvas does.
///
/// Returns `None` when any segment is negative or non-finite (the canvas
/// ignores such calls). Odd-length lists are repeated to make them even.
#[must_use]
pub fn normalize_dash(segments: &[f64]) -> Option<Vec<f64>> {
    if segments.iter().any(|s| !s.is_finite() || *s < 0.0) {
        return None;
    }
    let mut out = segments.to_vec();
    if out.len() % 2 == 1 {
        out.extend_from_slice(segments);
    }
    Some(out)
}

/// `true` when every value is finite; the canvas silently drops path and
/// paint calls with NaN or infinite arguments.
#[must_use]
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// The 2D drawing contract a drawing program is executed against.
///
/// None of these operations fail. Backend-level problems (a browser call
/// rejecting its arguments) are logged by the backend and otherwise ignored,
/// matching how the canvas treats invalid input.
pub trait Surface {
    /// Current style and transform state.
    fn state(&self) -> &DrawState;

    /// Number of unmatched `save` calls.
    fn depth(&self) -> usize;

    /// Unwind every save, restore default styles and drop the current path.
    fn reset(&mut self);

    // --- State stack ---

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    /// Rotate by `angle` radians.
    fn rotate(&mut self, angle: f64);
    fn scale(&mut self, x: f64, y: f64);

    // --- Style ---

    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, segments: &[f64]);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);

    // --- Path construction ---

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool);
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn close_path(&mut self);

    // --- Paint ---

    fn stroke(&mut self);
    fn fill(&mut self);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Intersect the clip region with the current path.
    fn clip(&mut self);
}
