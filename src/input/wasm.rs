use anyhow::{anyhow, Result};
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

use super::{InputSink, KeyCode, MouseButton, NamedKey};

type Listener = (EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>);

/// Forwards DOM input events into an [`InputSink`]. Listeners are removed
/// when the handler is dropped.
pub struct WasmInputHandler {
    listeners: Vec<Listener>,
}

impl WasmInputHandler {
    pub fn attach(canvas: &HtmlCanvasElement, sink: InputSink) -> Result<Self> {
        let window = window().ok_or_else(|| anyhow!("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("document not available"))?;
        let document: EventTarget = document.into();
        let canvas: EventTarget = canvas.clone().into();

        let mut handler = Self {
            listeners: Vec::new(),
        };

        // Keys are captured on the document so the canvas does not need focus.
        let keys = sink.clone();
        handler.listen(&document, "keydown", move |event| {
            if let Some(code) = event.dyn_ref::<KeyboardEvent>().and_then(map_key) {
                event.prevent_default();
                keys.key_down(code);
            }
        })?;
        let keys = sink.clone();
        handler.listen(&document, "keyup", move |event| {
            if let Some(code) = event.dyn_ref::<KeyboardEvent>().and_then(map_key) {
                event.prevent_default();
                keys.key_up(code);
            }
        })?;

        let mouse = sink.clone();
        handler.listen(&canvas, "mousedown", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                mouse.mouse_down(MouseButton::new(event.button() as u8));
            }
        })?;
        let mouse = sink.clone();
        handler.listen(&canvas, "mouseup", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                mouse.mouse_up(MouseButton::new(event.button() as u8));
            }
        })?;
        let mouse = sink.clone();
        handler.listen(&canvas, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                mouse.mouse_move(Vec2::new(event.offset_x() as f32, event.offset_y() as f32));
            }
        })?;

        for (name, phase) in [
            ("touchstart", TouchEdge::Start),
            ("touchmove", TouchEdge::Move),
            ("touchend", TouchEdge::End),
            ("touchcancel", TouchEdge::Cancel),
        ] {
            let touches = sink.clone();
            handler.listen(&canvas, name, move |event| {
                if let Some(event) = event.dyn_ref::<TouchEvent>() {
                    event.prevent_default();
                    forward_touches(&touches, event, phase);
                }
            })?;
        }

        Ok(handler)
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        name: &'static str,
        callback: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<()> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(callback);
        target
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("failed to add {name} listener: {err:?}"))?;
        self.listeners.push((target.clone(), name, closure));
        Ok(())
    }
}

impl Drop for WasmInputHandler {
    fn drop(&mut self) {
        for (target, name, closure) in self.listeners.drain(..) {
            let _ = target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

#[derive(Clone, Copy)]
enum TouchEdge {
    Start,
    Move,
    End,
    Cancel,
}

fn forward_touches(sink: &InputSink, event: &TouchEvent, edge: TouchEdge) {
    let changed = event.changed_touches();
    for i in 0..changed.length() {
        let Some(touch) = changed.get(i) else {
            continue;
        };
        let id = touch.identifier();
        let position = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
        match edge {
            TouchEdge::Start => sink.touch_start(id, position),
            TouchEdge::Move => sink.touch_move(id, position),
            TouchEdge::End => sink.touch_end(id, position),
            TouchEdge::Cancel => sink.touch_cancel(id),
        }
    }
}

fn map_key(event: &KeyboardEvent) -> Option<KeyCode> {
    match event.key().as_str() {
        "ArrowLeft" => Some(KeyCode::Named(NamedKey::Left)),
        "ArrowRight" => Some(KeyCode::Named(NamedKey::Right)),
        "ArrowUp" => Some(KeyCode::Named(NamedKey::Up)),
        "ArrowDown" => Some(KeyCode::Named(NamedKey::Down)),
        " " => Some(KeyCode::Named(NamedKey::Space)),
        other => KeyCode::from_name(other).or_else(|| KeyCode::from_dom_key_code(event.key_code())),
    }
}
