//! Rendering core of the geometry visualizer.
//!
//! This crate is compiled to WebAssembly and runs in the browser; everything
//! except [`web`], [`engine::Engine`] and [`bindings`] is plain Rust and is
//! also used natively by the server to verify generated programs. Drawing
//! programs are compiled once by [`script`] and executed against a
//! [`surface::Surface`]: the live canvas for animation, the SVG builder for
//! vector export.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser engine and testable [`engine::EngineCore`] |
//! | [`script`] | GeoScript compiler and interpreter |
//! | [`program`] | Holder for the current compiled program |
//! | [`surface`] | Drawing-surface trait and explicit state stack |
//! | [`svg`] | SVG string backend |
//! | [`web`] | Canvas 2D backend |
//! | [`clock`] | Frame counter, reveal progress and tick tokens |
//! | [`hit`] | Per-frame registry of interactive shapes |
//! | [`viewport`] | Logical size, device pixel ratio, pointer mapping |
//! | [`theme`] | Fixed drawing-area themes |
//! | [`consts`] | Shared constants (budgets, tolerances, durations) |

pub mod bindings;
pub mod clock;
pub mod consts;
pub mod engine;
pub mod hit;
pub mod program;
#[cfg(feature = "remote")]
pub mod remote;
pub mod script;
pub mod surface;
pub mod svg;
pub mod theme;
pub mod viewport;
pub mod web;

pub use bindings::init;
