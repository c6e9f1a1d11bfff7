//! Browser host: runs the Pong scene from a `requestAnimationFrame` loop.
#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement};

use crate::config::EngineConfig;
use crate::input::wasm::WasmInputHandler;
use crate::pong::{build_scene, Ball, PongHandles};
use crate::scene::Scene;
use crate::viewport::{Viewport, ViewportProvider, WindowViewport};

/// Longest step handed to the scene after the tab was hidden.
const MAX_DELTA: f32 = 0.25;

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
            _ => web_sys::console::log_1(&message),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen]
pub struct WebApp {
    state: Rc<RefCell<WebState>>,
    callback: FrameCallback,
}

#[wasm_bindgen]
impl WebApp {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String) -> Result<WebApp, JsValue> {
        let canvas = find_canvas(&canvas_id).map_err(to_js)?;
        let viewport = WindowViewport::new(canvas.width(), canvas.height());

        let config = EngineConfig {
            viewport: viewport.viewport(),
            ..EngineConfig::default()
        };
        let mut scene = Scene::new(config);
        let handles = build_scene(&mut scene);
        let input = WasmInputHandler::attach(&canvas, scene.input_sink()).map_err(to_js)?;
        info!("Loaded scene with {} entities", scene.len());

        let state = WebState {
            scene,
            handles,
            canvas,
            viewport,
            last_timestamp: None,
            request_id: None,
            _input: input,
        };
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            callback: Rc::new(RefCell::new(None)),
        })
    }

    /// Starts the frame loop. Calling it while already running does nothing.
    pub fn start(&self) -> Result<(), JsValue> {
        if self.state.borrow().request_id.is_some() {
            return Ok(());
        }
        let state = Rc::clone(&self.state);
        let callback = Rc::clone(&self.callback);
        *self.callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            state.borrow_mut().tick(timestamp);
            if let Err(err) = request_frame(&state, &callback) {
                error!("frame loop stopped: {err}");
            }
        }) as Box<dyn FnMut(f64)>));
        request_frame(&self.state, &self.callback).map_err(to_js)
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.request_id.take() {
            let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
            window.cancel_animation_frame(id)?;
        }
        state.scene.set_paused(true);
        Ok(())
    }

    pub fn resume(&self) -> Result<(), JsValue> {
        {
            let mut state = self.state.borrow_mut();
            state.last_timestamp = None;
            state.scene.set_paused(false);
        }
        self.start()
    }

    #[wasm_bindgen(getter)]
    pub fn score1(&self) -> u32 {
        self.state.borrow().score().0
    }

    #[wasm_bindgen(getter)]
    pub fn score2(&self) -> u32 {
        self.state.borrow().score().1
    }

    /// Draw commands produced by the last frame.
    #[wasm_bindgen(getter)]
    pub fn draw_count(&self) -> usize {
        self.state.borrow().scene.draws().len()
    }
}

struct WebState {
    scene: Scene,
    handles: PongHandles,
    canvas: HtmlCanvasElement,
    viewport: WindowViewport,
    last_timestamp: Option<f64>,
    request_id: Option<i32>,
    _input: WasmInputHandler,
}

impl WebState {
    fn tick(&mut self, timestamp: f64) {
        self.request_id = None;
        let delta = match self.last_timestamp {
            Some(last) => (((timestamp - last) / 1000.0) as f32).clamp(0.0, MAX_DELTA),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp);

        let (width, height) = (self.canvas.client_width(), self.canvas.client_height());
        if width > 0 && height > 0 && self.viewport.update(width as u32, height as u32) {
            let Viewport { width, height } = self.viewport.viewport();
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.scene.window_resized(self.viewport.viewport());
        }
        self.scene.frame(delta);
    }

    fn score(&self) -> (u32, u32) {
        self.scene
            .behavior::<Ball>(self.handles.ball)
            .map(|ball| (ball.score1, ball.score2))
            .unwrap_or_default()
    }
}

fn request_frame(state: &Rc<RefCell<WebState>>, callback: &FrameCallback) -> Result<()> {
    let window = window().ok_or_else(|| anyhow!("window not available"))?;
    let callback = callback.borrow();
    let closure = callback
        .as_ref()
        .ok_or_else(|| anyhow!("frame callback missing"))?;
    let id = window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
    state.borrow_mut().request_id = Some(id);
    Ok(())
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement> {
    let document = window()
        .and_then(|win| win.document())
        .ok_or_else(|| anyhow!("document not available"))?;
    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("canvas element {canvas_id:?} not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element {canvas_id:?} is not a canvas"))
}

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}
