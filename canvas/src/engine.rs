//! The visualizer engine: scheduler, program host and registry wired together.
//!
//! [`EngineCore`] holds every piece of state and logic that does not need a
//! browser. It draws through `&mut dyn Surface`, so tests drive it with an
//! in-memory surface. [`Engine`] wraps it with the canvas element,
//! `requestAnimationFrame` scheduling, resize observation and downloads.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Element, HtmlAnchorElement, HtmlCanvasElement, ResizeObserver, ResizeObserverEntry, Url};

use crate::clock::{AnimationClock, TickScheduler, TickToken};
use crate::consts::{DEFAULT_PRIMARY_COLOR, PLACEHOLDER_FONT, PLACEHOLDER_TEXT, TOOLTIP_OFFSET_PX};
use crate::hit::ShapeRegistry;
use crate::program::ProgramHost;
use crate::script::{CompileError, FrameParams, RuntimeError, clean_source};
use crate::surface::{Surface, TextAlign};
use crate::svg::SvgSurface;
use crate::theme::Theme;
use crate::viewport::{ElementRect, Point, Viewport};
use crate::web::{self, WebSurface};

/// Errors surfaced to the host page.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("no drawing program is loaded")]
    NoProgram,
    #[error("a generation request is already in progress")]
    GenerationPending,
    #[error("engine has been torn down")]
    Disposed,
    #[error("export failed: {0}")]
    Export(String),
    #[error("generation failed: {0}")]
    Generation(String),
}

/// What the page should show after a pointer event.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerOutcome {
    /// Hovering a shape: show `text` at client position (`x`, `y`).
    Tooltip { text: String, x: f64, y: f64 },
    /// Clicked a shape: show an info dialog with `message`.
    Info { message: String },
    /// Nothing under the pointer: hide the tooltip.
    Clear,
}

impl PointerOutcome {
    /// CSS cursor for the canvas.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match self {
            Self::Tooltip { .. } | Self::Info { .. } => "pointer",
            Self::Clear => "default",
        }
    }
}

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

/// Kinds of file the engine can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

/// Download file name for an export taken at `unix_ms`.
#[must_use]
pub fn export_file_name(format: ExportFormat, unix_ms: u64) -> String {
    match format {
        ExportFormat::Svg => format!("geo-vector-{unix_ms}.svg"),
        ExportFormat::Png => format!("geo-image-{unix_ms}.png"),
    }
}

// =============================================================
// EngineCore
// =============================================================

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from [`Engine`] so it can be tested without WASM/browser
/// dependencies.
#[derive(Debug)]
pub struct EngineCore {
    pub host: ProgramHost,
    pub clock: AnimationClock,
    pub scheduler: TickScheduler,
    pub registry: ShapeRegistry,
    pub viewport: Viewport,
    pub theme: Theme,
    pub show_grid: bool,
    pub primary_color: String,
    last_error: Option<String>,
    next_ticket: u64,
    pending: Option<GenerationTicket>,
    disposed: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            host: ProgramHost::new(),
            clock: AnimationClock::new(),
            scheduler: TickScheduler::new(),
            registry: ShapeRegistry::new(),
            viewport: Viewport::default(),
            theme: Theme::default(),
            show_grid: true,
            primary_color: DEFAULT_PRIMARY_COLOR.to_owned(),
            last_error: None,
            next_ticket: 0,
            pending: None,
            disposed: false,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    /// Parameters for the frame at the current counter.
    #[must_use]
    pub fn frame_params(&self) -> FrameParams {
        FrameParams {
            width: self.viewport.width,
            height: self.viewport.height,
            frame: self.clock.frame(),
            theme: self.theme,
            show_grid: self.show_grid,
            primary_color: self.primary_color.clone(),
        }
    }

    /// Message of the last runtime failure, cleared by the next compile.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` while a generation request is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // --- Program ---

    /// Clean and compile program text, then switch to the settled figure.
    ///
    /// The caller redraws afterwards. On failure the previous program and
    /// playback state are left untouched.
    ///
    /// # Errors
    ///
    /// [`EngineError::Disposed`] after teardown, otherwise the
    /// [`CompileError`].
    pub fn compile(&mut self, raw: &str) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        let source = clean_source(raw);
        self.host.compile(&source)?;
        self.scheduler.cancel();
        self.clock.show_result();
        self.registry.discard();
        self.last_error = None;
        log::info!("drawing program compiled ({} bytes)", source.len());
        Ok(())
    }

    // --- Frames ---

    /// Draw one frame at the current counter.
    ///
    /// Clears the drawing area, applies the reveal clip while playing and
    /// runs the program. Shapes registered during the frame become queryable
    /// only if it completes. A failing program pauses playback, resets the
    /// surface and drops the registry.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoProgram`], [`EngineError::Disposed`] or the program's
    /// [`RuntimeError`].
    pub fn render_frame(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        if !self.host.is_compiled() {
            return Err(EngineError::NoProgram);
        }
        let params = self.frame_params();
        let (width, height) = (params.width, params.height);

        surface.reset();
        surface.save();
        surface.clear_rect(0.0, 0.0, width, height);
        if let Some(clip_width) = self.clock.clip_width(width) {
            surface.begin_path();
            surface.rect(0.0, 0.0, clip_width, height);
            surface.clip();
        }

        self.registry.begin_frame();
        let registry = &mut self.registry;
        let result = self.host.invoke(surface, &params, &mut |shape| registry.register(shape));
        surface.restore();

        match result {
            Ok(_) => {
                let depth = surface.depth();
                if depth > 0 {
                    log::warn!("frame {} left {depth} unmatched save(s); unwinding", params.frame);
                    surface.reset();
                }
                self.registry.publish();
                Ok(())
            }
            Err(err) => {
                log::error!("drawing program failed at frame {}: {err}", params.frame);
                self.registry.discard();
                self.clock.pause();
                self.scheduler.cancel();
                self.last_error = Some(err.to_string());
                surface.reset();
                Err(err.into())
            }
        }
    }

    /// Handle a scheduled tick: render, then advance the counter.
    ///
    /// Returns the token for the next tick while playback continues. Stale
    /// tokens and ticks arriving while paused return `Ok(None)` without
    /// drawing.
    ///
    /// # Errors
    ///
    /// Propagates [`render_frame`](Self::render_frame) failures; playback is
    /// already stopped when this returns `Err`.
    pub fn tick(&mut self, token: TickToken, surface: &mut dyn Surface) -> Result<Option<TickToken>, EngineError> {
        if !self.scheduler.accept(token) {
            log::debug!("ignoring stale tick {token:?}");
            return Ok(None);
        }
        if !self.clock.is_playing() {
            return Ok(None);
        }
        self.render_frame(surface)?;
        self.clock.advance();
        Ok(if self.clock.is_playing() { self.scheduler.schedule() } else { None })
    }

    /// Redraw the current frame without advancing. While playing this is a
    /// no-op because the next tick repaints anyway. Without a program
    /// nothing is drawn.
    ///
    /// # Errors
    ///
    /// Propagates [`render_frame`](Self::render_frame) failures.
    pub fn redraw(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        if self.clock.is_playing() || !self.host.is_compiled() {
            return Ok(());
        }
        self.render_frame(surface)
    }

    /// Paint the "generating" message.
    pub fn draw_placeholder(&self, surface: &mut dyn Surface) {
        let (width, height) = (self.viewport.width, self.viewport.height);
        surface.reset();
        surface.clear_rect(0.0, 0.0, width, height);
        surface.set_font(PLACEHOLDER_FONT);
        surface.set_fill_style(self.theme.placeholder_color());
        surface.set_text_align(TextAlign::Center);
        surface.fill_text(PLACEHOLDER_TEXT, width / 2.0, height / 2.0);
    }

    // --- Playback ---

    /// Resume from the current counter. Returns the token of the first tick
    /// to schedule, or `None` if there is nothing to play, a generation is in
    /// flight, or a tick chain is already live.
    pub fn play(&mut self) -> Option<TickToken> {
        if !self.can_play() {
            return None;
        }
        self.clock.play();
        self.scheduler.schedule()
    }

    fn can_play(&self) -> bool {
        !self.disposed && self.pending.is_none() && self.host.is_compiled()
    }

    /// Stop playback and invalidate the outstanding tick.
    pub fn pause(&mut self) {
        self.clock.pause();
        self.scheduler.cancel();
    }

    /// Restart the construction from frame zero. Ignored while a generation
    /// is in flight.
    pub fn replay(&mut self) -> Option<TickToken> {
        if !self.can_play() {
            return None;
        }
        self.scheduler.cancel();
        self.clock.replay();
        self.scheduler.schedule()
    }

    // --- Settings ---

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    pub fn set_primary_color(&mut self, color: &str) {
        color.clone_into(&mut self.primary_color);
    }

    pub fn set_reveal(&mut self, enabled: bool) {
        self.clock.set_reveal(enabled);
    }

    /// Apply a container resize. Returns `true` when the viewport changed and
    /// the backing buffer must be resized and redrawn.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> bool {
        self.viewport.resize(width, height, dpr)
    }

    // --- Pointer ---

    /// Resolve a pointer event against the last completed frame.
    #[must_use]
    pub fn pointer(&self, client: Point, rect: ElementRect, click: bool) -> PointerOutcome {
        let hit = self
            .viewport
            .client_to_logical(client, rect)
            .and_then(|logical| self.registry.resolve(logical));
        match hit {
            Some(shape) if click => PointerOutcome::Info { message: format!("Инфо: {}", shape.info) },
            Some(shape) => PointerOutcome::Tooltip {
                text: shape.info.clone(),
                x: client.x + TOOLTIP_OFFSET_PX,
                y: client.y + TOOLTIP_OFFSET_PX,
            },
            None => PointerOutcome::Clear,
        }
    }

    // --- Export ---

    /// Render the current frame once into an SVG document.
    ///
    /// Shapes registered during export are ignored and no animation state
    /// changes.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoProgram`], or [`EngineError::Export`] when the
    /// program fails.
    pub fn export_svg(&self) -> Result<String, EngineError> {
        if !self.host.is_compiled() {
            return Err(EngineError::NoProgram);
        }
        let params = self.frame_params();
        let mut svg = SvgSurface::new(params.width, params.height, self.theme.background_hex());
        self.host
            .invoke(&mut svg, &params, &mut |_| {})
            .map_err(|err| EngineError::Export(err.to_string()))?;
        Ok(svg.document())
    }

    // --- Generation ---

    /// Start a generation request: pauses playback and marks the engine busy.
    ///
    /// # Errors
    ///
    /// [`EngineError::GenerationPending`] while another request is
    /// outstanding, [`EngineError::Disposed`] after teardown.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        if self.pending.is_some() {
            return Err(EngineError::GenerationPending);
        }
        self.pause();
        self.next_ticket += 1;
        let ticket = GenerationTicket(self.next_ticket);
        self.pending = Some(ticket);
        Ok(ticket)
    }

    /// Complete the request identified by `ticket`.
    ///
    /// Returns `Ok(true)` when the generated program was installed (the
    /// caller redraws), `Ok(false)` when the result was discarded because
    /// the engine was torn down or the ticket is no longer current.
    ///
    /// # Errors
    ///
    /// [`EngineError::Generation`] when the request itself failed, or the
    /// compile error of the generated program.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<String, String>,
    ) -> Result<bool, EngineError> {
        if self.disposed || self.pending != Some(ticket) {
            log::info!("discarding result of generation {ticket:?}");
            return Ok(false);
        }
        self.pending = None;
        let source = result.map_err(EngineError::Generation)?;
        self.compile(&source)?;
        Ok(true)
    }

    /// Stop everything and drop the program. Later results are discarded.
    pub fn teardown(&mut self) {
        self.pause();
        self.pending = None;
        self.host.clear();
        self.registry.discard();
        self.disposed = true;
    }
}

// =============================================================
// Engine (browser)
// =============================================================

/// A scheduled `requestAnimationFrame` callback.
struct PendingFrame {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

/// A live `ResizeObserver` and its callback.
struct Observer {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

struct Inner {
    canvas: HtmlCanvasElement,
    surface: WebSurface,
    core: EngineCore,
    frame: Option<PendingFrame>,
    observer: Option<Observer>,
}

/// The full engine. Owns the canvas element and the browser callbacks.
///
/// Cloning is cheap and shares the same engine, which is how async
/// generation requests and scheduled frames reach it.
#[derive(Clone)]
pub struct Engine {
    inner: Rc<RefCell<Inner>>,
    #[cfg(feature = "remote")]
    api_base: Rc<str>,
}

impl Engine {
    /// Create an engine bound to `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let dpr = device_pixel_ratio();
        let surface = WebSurface::from_canvas(&canvas, dpr)?;
        let inner = Inner { canvas, surface, core: EngineCore::new(), frame: None, observer: None };
        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
            #[cfg(feature = "remote")]
            api_base: Rc::from(""),
        })
    }

    /// Send generation requests to `base` instead of the page origin.
    #[cfg(feature = "remote")]
    #[must_use]
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = Rc::from(base.trim_end_matches('/'));
        self
    }

    // --- Viewport ---

    /// Apply a new logical size and device pixel ratio.
    pub fn set_viewport(&self, width: f64, height: f64, dpr: f64) {
        apply_viewport(&self.inner, width, height, dpr);
    }

    /// Track the content size of `container` with a `ResizeObserver`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the observer cannot be created.
    pub fn observe_resize(&self, container: &Element) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        let callback: Closure<dyn FnMut(js_sys::Array)> = Closure::new(move |entries: js_sys::Array| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            for entry in entries.iter() {
                let entry: ResizeObserverEntry = entry.unchecked_into();
                let rect = entry.content_rect();
                apply_viewport(&inner, rect.width(), rect.height(), device_pixel_ratio());
            }
        });
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(container);

        let mut inner = self.inner.borrow_mut();
        if let Some(old) = inner.observer.take() {
            old.observer.disconnect();
        }
        inner.observer = Some(Observer { observer, _callback: callback });
        Ok(())
    }

    // --- Program ---

    /// Compile program text and show the settled figure.
    ///
    /// # Errors
    ///
    /// Returns the compile error; the previous program keeps running.
    pub fn compile(&self, raw: &str) -> Result<(), EngineError> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.core.compile(raw)?;
        cancel_frame(inner);
        inner.core.redraw(&mut inner.surface)
    }

    /// Ask the server for a program matching `description` and install it.
    ///
    /// Returns `Ok(false)` when the result arrived after teardown.
    ///
    /// # Errors
    ///
    /// [`EngineError::GenerationPending`] while another request runs, the
    /// request failure, or the generated program's compile error.
    #[cfg(feature = "remote")]
    pub async fn generate(&self, description: &str) -> Result<bool, EngineError> {
        let ticket = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let ticket = inner.core.begin_generation()?;
            cancel_frame(inner);
            inner.core.draw_placeholder(&mut inner.surface);
            ticket
        };

        let result = crate::remote::generate_program(&self.api_base, description)
            .await
            .map_err(|err| err.to_string());

        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let installed = inner.core.finish_generation(ticket, result)?;
        if installed {
            inner.core.redraw(&mut inner.surface)?;
        }
        Ok(installed)
    }

    // --- Playback ---

    pub fn play(&self) {
        let token = self.inner.borrow_mut().core.play();
        if let Some(token) = token {
            request_frame(&self.inner, token);
        }
    }

    pub fn pause(&self) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.core.pause();
        cancel_frame(inner);
    }

    pub fn replay(&self) {
        let token = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            cancel_frame(inner);
            inner.core.replay()
        };
        if let Some(token) = token {
            request_frame(&self.inner, token);
        }
    }

    // --- Settings ---

    pub fn set_theme(&self, theme: Theme) {
        self.update(|core| core.set_theme(theme));
    }

    pub fn set_show_grid(&self, show: bool) {
        self.update(|core| core.set_show_grid(show));
    }

    pub fn set_primary_color(&self, color: &str) {
        self.update(|core| core.set_primary_color(color));
    }

    pub fn set_reveal(&self, enabled: bool) {
        self.update(|core| core.set_reveal(enabled));
    }

    /// Change a setting, then repaint the paused frame.
    fn update(&self, change: impl FnOnce(&mut EngineCore)) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        change(&mut inner.core);
        if let Err(err) = inner.core.redraw(&mut inner.surface) {
            log::error!("redraw failed: {err}");
        }
    }

    // --- Pointer ---

    /// Hit-test a pointer event at client coordinates and update the cursor.
    #[must_use]
    pub fn on_pointer(&self, client_x: f64, client_y: f64, click: bool) -> PointerOutcome {
        let inner = self.inner.borrow();
        let bounds = inner.canvas.get_bounding_client_rect();
        let rect = ElementRect { left: bounds.left(), top: bounds.top(), width: bounds.width(), height: bounds.height() };
        let outcome = inner.core.pointer(Point::new(client_x, client_y), rect, click);
        if let Err(err) = inner.canvas.style().set_property("cursor", outcome.cursor()) {
            log::warn!("failed to set cursor: {err:?}");
        }
        outcome
    }

    // --- Export ---

    /// SVG document of the current frame.
    ///
    /// # Errors
    ///
    /// See [`EngineCore::export_svg`].
    pub fn export_svg(&self) -> Result<String, EngineError> {
        self.inner.borrow().core.export_svg()
    }

    /// Download the current frame as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Export`] if the document or the download fails.
    pub fn download_svg(&self) -> Result<(), EngineError> {
        let document = self.export_svg()?;
        let parts = js_sys::Array::of1(&JsValue::from_str(&document));
        let options = BlobPropertyBag::new();
        options.set_type("image/svg+xml;charset=utf-8");
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(export_error)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(export_error)?;
        let result = trigger_download(&url, &export_file_name(ExportFormat::Svg, unix_ms()));
        if let Err(err) = Url::revoke_object_url(&url) {
            log::warn!("failed to revoke object URL: {err:?}");
        }
        result
    }

    /// Download the canvas backing buffer as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Export`] if encoding or the download fails.
    pub fn download_png(&self) -> Result<(), EngineError> {
        let url = web::png_data_url(&self.inner.borrow().canvas).map_err(export_error)?;
        trigger_download(&url, &export_file_name(ExportFormat::Png, unix_ms()))
    }

    // --- Queries ---

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.inner.borrow().core.clock.is_playing()
    }

    #[must_use]
    pub fn reveal_progress(&self) -> f64 {
        self.inner.borrow().core.clock.reveal_progress()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.borrow().core.last_error().map(str::to_owned)
    }

    // --- Lifecycle ---

    /// Stop the animation, disconnect the observer and drop the program.
    pub fn teardown(&self) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.core.teardown();
        cancel_frame(inner);
        if let Some(observer) = inner.observer.take() {
            observer.observer.disconnect();
        }
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unix_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn export_error(err: JsValue) -> EngineError {
    EngineError::Export(format!("{err:?}"))
}

fn apply_viewport(inner: &Rc<RefCell<Inner>>, width: f64, height: f64, dpr: f64) {
    let mut guard = inner.borrow_mut();
    let inner = &mut *guard;
    if !inner.core.resize(width, height, dpr) {
        return;
    }
    let (backing_w, backing_h) = inner.core.viewport.backing_size();
    inner.canvas.set_width(backing_w);
    inner.canvas.set_height(backing_h);
    inner.surface.set_dpr(inner.core.viewport.dpr);
    inner.surface.reset();
    if let Err(err) = inner.core.redraw(&mut inner.surface) {
        log::error!("redraw after resize failed: {err}");
    }
}

/// Schedule the tick identified by `token` on the next animation frame.
fn request_frame(inner: &Rc<RefCell<Inner>>, token: TickToken) {
    let weak = Rc::downgrade(inner);
    let callback: Closure<dyn FnMut()> = Closure::once(move || on_frame(&weak, token));
    let Some(window) = web_sys::window() else {
        log::error!("no window; animation stopped");
        return;
    };
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(handle) => inner.borrow_mut().frame = Some(PendingFrame { handle, _callback: callback }),
        Err(err) => log::error!("requestAnimationFrame failed: {err:?}"),
    }
}

fn on_frame(weak: &Weak<RefCell<Inner>>, token: TickToken) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let next = {
        let mut guard = inner.borrow_mut();
        let state = &mut *guard;
        match state.core.tick(token, &mut state.surface) {
            Ok(next) => next,
            Err(err) => {
                log::error!("animation stopped: {err}");
                None
            }
        }
    };
    if let Some(token) = next {
        request_frame(&inner, token);
    }
}

fn cancel_frame(inner: &mut Inner) {
    if let Some(frame) = inner.frame.take() {
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.cancel_animation_frame(frame.handle) {
                log::warn!("cancelAnimationFrame failed: {err:?}");
            }
        }
    }
}

fn trigger_download(href: &str, file_name: &str) -> Result<(), EngineError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| EngineError::Export("no document".to_owned()))?;
    let anchor = document
        .create_element("a")
        .map_err(export_error)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| EngineError::Export("anchor element has unexpected type".to_owned()))?;
    anchor.set_href(href);
    anchor.set_download(file_name);
    anchor.click();
    Ok(())
}
