//! JavaScript entry points.
//!
//! A thin `#[wasm_bindgen]` facade over [`Engine`]: errors become JS
//! exceptions carrying the error's display string, and pointer outcomes are
//! returned as plain objects (`{kind: "tooltip", text, x, y}`,
//! `{kind: "info", message}` or `{kind: "clear"}`).

use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement};

use crate::engine::{Engine, EngineError};
use crate::theme::Theme;

/// Install the panic hook and the console logger. Safe to call twice.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("logger already initialised");
    }
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct Visualizer {
    engine: Engine,
}

#[wasm_bindgen]
impl Visualizer {
    /// Bind to `canvas`. Throws if the canvas has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<Visualizer, JsValue> {
        Ok(Self { engine: Engine::new(canvas)? })
    }

    /// Size the canvas from `container`'s content box and follow its resizes.
    pub fn observe(&self, container: &Element) -> Result<(), JsValue> {
        self.engine.observe_resize(container)
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&self, width: f64, height: f64, dpr: f64) {
        self.engine.set_viewport(width, height, dpr);
    }

    /// Compile program text and show the finished figure.
    pub fn compile(&self, source: &str) -> Result<(), JsValue> {
        self.engine.compile(source).map_err(to_js)
    }

    /// Request a program for `description`. Resolves to `true` once it is
    /// installed, `false` if the visualizer was torn down meanwhile.
    #[cfg(feature = "remote")]
    pub fn generate(&self, description: String) -> js_sys::Promise {
        let engine = self.engine.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            engine.generate(&description).await.map(JsValue::from_bool).map_err(to_js)
        })
    }

    pub fn play(&self) {
        self.engine.play();
    }

    pub fn pause(&self) {
        self.engine.pause();
    }

    pub fn replay(&self) {
        self.engine.replay();
    }

    /// Switch theme by key. Returns `false` for unknown keys.
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, key: &str) -> bool {
        match Theme::from_key(key) {
            Some(theme) => {
                self.engine.set_theme(theme);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = setShowGrid)]
    pub fn set_show_grid(&self, show: bool) {
        self.engine.set_show_grid(show);
    }

    #[wasm_bindgen(js_name = setPrimaryColor)]
    pub fn set_primary_color(&self, color: &str) {
        self.engine.set_primary_color(color);
    }

    #[wasm_bindgen(js_name = setReveal)]
    pub fn set_reveal(&self, enabled: bool) {
        self.engine.set_reveal(enabled);
    }

    /// Hit-test a pointer event given in client coordinates.
    pub fn pointer(&self, client_x: f64, client_y: f64, click: bool) -> Result<JsValue, JsValue> {
        let outcome = self.engine.on_pointer(client_x, client_y, click);
        let json = serde_json::to_string(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))?;
        js_sys::JSON::parse(&json)
    }

    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> Result<String, JsValue> {
        self.engine.export_svg().map_err(to_js)
    }

    #[wasm_bindgen(js_name = downloadSvg)]
    pub fn download_svg(&self) -> Result<(), JsValue> {
        self.engine.download_svg().map_err(to_js)
    }

    #[wasm_bindgen(js_name = downloadPng)]
    pub fn download_png(&self) -> Result<(), JsValue> {
        self.engine.download_png().map_err(to_js)
    }

    #[wasm_bindgen(getter, js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    #[wasm_bindgen(getter, js_name = revealProgress)]
    pub fn reveal_progress(&self) -> f64 {
        self.engine.reveal_progress()
    }

    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.engine.last_error()
    }

    pub fn teardown(&self) {
        self.engine.teardown();
    }
}
