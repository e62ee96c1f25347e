//! Shared numeric constants for the canvas crate.

// ── Animation ───────────────────────────────────────────────────

/// Number of frames the reveal (wipe) clip takes to uncover the full width.
pub const REVEAL_DURATION_FRAMES: u64 = 120;

/// Frame counter used for the static "finished figure" view after a compile.
///
/// Large enough that any finite construction animation has completed.
pub const STATIC_RESULT_FRAME: u64 = 6000;

// ── Hit-testing ─────────────────────────────────────────────────

/// Extra slop in logical pixels added to point and circle radii.
pub const HIT_TOLERANCE_PX: f64 = 5.0;

/// Radius used for points and circles registered without one.
pub const DEFAULT_POINT_RADIUS: f64 = 10.0;

/// Tooltip offset from the pointer, in CSS pixels.
pub const TOOLTIP_OFFSET_PX: f64 = 10.0;

// ── SVG export ──────────────────────────────────────────────────

/// Arcs spanning at least `2π - FULL_CIRCLE_EPSILON` are emitted as circles.
pub const FULL_CIRCLE_EPSILON: f64 = 0.001;

/// Font size used when the font string carries no `<n>px` token.
pub const DEFAULT_SVG_FONT_SIZE: &str = "12";

// ── Drawing programs ────────────────────────────────────────────

/// Evaluation steps a single frame invocation may take.
pub const MAX_STEPS_PER_FRAME: u64 = 1_000_000;

/// Maximum nesting of user function calls.
pub const MAX_CALL_DEPTH: usize = 64;

/// Maximum nesting of statements and expressions in program text, and of
/// arrays inside arrays when a value is converted to a string.
pub const MAX_NESTING: usize = 128;

/// Maximum depth of statement and expression evaluation, counted across calls.
pub const MAX_EVAL_DEPTH: usize = 512;

/// Longest array a program may build.
pub const MAX_ARRAY_LEN: usize = 1 << 20;

/// Longest string (in bytes) a program may build.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// New storage a single invocation may allocate, counted in array slots and
/// string bytes.
pub const MAX_ALLOC_PER_FRAME: usize = 1 << 22;

// ── Engine defaults ─────────────────────────────────────────────

/// Stroke color handed to programs as `primaryColor` until the user picks one.
pub const DEFAULT_PRIMARY_COLOR: &str = "#60a5fa";

/// Message drawn while a generation request is in flight.
pub const PLACEHOLDER_TEXT: &str = "AI ја анализира геометријата...";

/// Font used for the placeholder message.
pub const PLACEHOLDER_FONT: &str = "16px Inter";
