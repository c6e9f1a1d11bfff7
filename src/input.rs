//! Frame-buffered keyboard, mouse and touch state.
//!
//! Host callbacks write raw events through an [`InputSink`] at any time.
//! Once per frame the scene calls [`InputState::advance`], which shifts the
//! `current` snapshot into `previous` and copies the sink's pending state
//! into `current`. Gameplay code only ever reads the two settled
//! snapshots, so edge queries (`key_down`, `key_up`) are stable for the
//! whole frame.

mod touch;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use touch::{Touch, TouchData, TouchPhase};

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }

    /// Maps a legacy DOM `keyCode` to a key.
    pub fn from_dom_key_code(code: u32) -> Option<Self> {
        use NamedKey::*;
        let key = match code {
            8 => Self::Named(Backspace),
            9 => Self::Named(Tab),
            13 => Self::Named(Enter),
            16 => Self::Named(LeftShift),
            17 => Self::Named(LeftCtrl),
            18 => Self::Named(LeftAlt),
            27 => Self::Named(Escape),
            32 => Self::Named(Space),
            33 => Self::Named(PageUp),
            34 => Self::Named(PageDown),
            35 => Self::Named(End),
            36 => Self::Named(Home),
            37 => Self::Named(Left),
            38 => Self::Named(Up),
            39 => Self::Named(Right),
            40 => Self::Named(Down),
            48..=57 => Self::Digit((code - 48) as u8),
            65..=90 => Self::Character(char::from(code as u8)),
            112..=123 => Self::Function((code - 111) as u8),
            _ => return None,
        };
        Some(key)
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "LeftShift" | "LShift" => LeftShift,
        "RightShift" | "RShift" => RightShift,
        "LeftCtrl" | "LControl" => LeftCtrl,
        "RightCtrl" | "RControl" => RightCtrl,
        "LeftAlt" | "LAlt" => LeftAlt,
        "RightAlt" | "RAlt" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Identifier for a mouse button, numbered like DOM `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const MIDDLE: Self = Self(1);
    pub const RIGHT: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Raw state written by event callbacks, waiting for the next advance.
#[derive(Debug, Default, Clone)]
struct PendingInput {
    keys: HashMap<KeyCode, bool>,
    buttons: HashMap<MouseButton, bool>,
    mouse_position: Vec2,
    touches: Vec<TouchData>,
}

/// Cloneable writer for host event callbacks.
///
/// Every clone feeds the same pending frame; the lock is held only for the
/// duration of a single write or of the per-frame copy.
#[derive(Debug, Default, Clone)]
pub struct InputSink {
    pending: Arc<Mutex<PendingInput>>,
}

impl InputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&self, key: KeyCode) {
        self.pending.lock().keys.insert(key, true);
    }

    pub fn key_up(&self, key: KeyCode) {
        self.pending.lock().keys.insert(key, false);
    }

    pub fn mouse_down(&self, button: MouseButton) {
        self.pending.lock().buttons.insert(button, true);
    }

    pub fn mouse_up(&self, button: MouseButton) {
        self.pending.lock().buttons.insert(button, false);
    }

    pub fn mouse_move(&self, position: Vec2) {
        self.pending.lock().mouse_position = position;
    }

    /// A new finger went down. Reusing a live `finger_id` restarts it.
    pub fn touch_start(&self, finger_id: i32, position: Vec2) {
        let mut pending = self.pending.lock();
        pending.touches.retain(|touch| touch.finger_id != finger_id);
        pending.touches.push(TouchData::began(finger_id, position));
    }

    pub fn touch_move(&self, finger_id: i32, position: Vec2) {
        self.update_touch(finger_id, |touch| {
            touch.delta_position = position - touch.position;
            touch.position = position;
            touch.phase = TouchPhase::Moved;
        });
    }

    pub fn touch_end(&self, finger_id: i32, position: Vec2) {
        self.update_touch(finger_id, |touch| {
            touch.delta_position = position - touch.position;
            touch.position = position;
            touch.phase = TouchPhase::Ended;
        });
    }

    pub fn touch_cancel(&self, finger_id: i32) {
        self.update_touch(finger_id, |touch| touch.phase = TouchPhase::Canceled);
    }

    fn update_touch(&self, finger_id: i32, apply: impl FnOnce(&mut TouchData)) {
        let mut pending = self.pending.lock();
        if let Some(touch) = pending
            .touches
            .iter_mut()
            .find(|touch| touch.finger_id == finger_id)
        {
            apply(touch);
        }
    }
}

/// Previous and current snapshots of a code-to-pressed mapping.
#[derive(Debug, Clone)]
pub struct FrameBuffer<K> {
    previous: HashMap<K, bool>,
    current: HashMap<K, bool>,
}

impl<K> Default for FrameBuffer<K> {
    fn default() -> Self {
        Self {
            previous: HashMap::new(),
            current: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> FrameBuffer<K> {
    fn advance(&mut self, next: &HashMap<K, bool>) {
        self.previous = std::mem::replace(&mut self.current, next.clone());
    }

    fn in_current(&self, code: K) -> bool {
        self.current.get(&code).copied().unwrap_or(false)
    }

    fn in_previous(&self, code: K) -> bool {
        self.previous.get(&code).copied().unwrap_or(false)
    }

    pub fn held(&self, code: K) -> bool {
        self.in_current(code)
    }

    pub fn pressed(&self, code: K) -> bool {
        self.in_current(code) && !self.in_previous(code)
    }

    pub fn released(&self, code: K) -> bool {
        self.in_previous(code) && !self.in_current(code)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Keyboard {
    frames: FrameBuffer<KeyCode>,
}

impl Keyboard {
    /// True while the key is held.
    pub fn key(&self, key: KeyCode) -> bool {
        self.frames.held(key)
    }

    /// True only on the frame the key went down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.frames.pressed(key)
    }

    /// True only on the frame the key was released.
    pub fn key_up(&self, key: KeyCode) -> bool {
        self.frames.released(key)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Mouse {
    frames: FrameBuffer<MouseButton>,
    previous_position: Vec2,
    position: Vec2,
}

impl Mouse {
    pub fn button(&self, button: MouseButton) -> bool {
        self.frames.held(button)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.frames.pressed(button)
    }

    pub fn button_up(&self, button: MouseButton) -> bool {
        self.frames.released(button)
    }

    /// Pointer position in canvas pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Movement since the previous frame.
    pub fn delta(&self) -> Vec2 {
        self.position - self.previous_position
    }
}

/// Settled input for the current frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub keyboard: Keyboard,
    pub mouse: Mouse,
    pub touch: Touch,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts every device one frame forward: keyboard, then mouse, then
    /// touch.
    pub fn advance(&mut self, sink: &InputSink, delta_time: f32) {
        let mut pending = sink.pending.lock();

        self.keyboard.frames.advance(&pending.keys);

        self.mouse.frames.advance(&pending.buttons);
        self.mouse.previous_position = self.mouse.position;
        self.mouse.position = pending.mouse_position;

        self.touch.advance(&mut pending.touches, delta_time);
    }

    /// Looks up a key or mouse button by name ("Space", "W", "Mouse1").
    pub fn held_by_name(&self, name: &str) -> bool {
        match parse_input_name(name) {
            Some(InputName::Key(key)) => self.keyboard.key(key),
            Some(InputName::Mouse(button)) => self.mouse.button(button),
            None => false,
        }
    }
}

enum InputName {
    Key(KeyCode),
    Mouse(MouseButton),
}

fn parse_input_name(name: &str) -> Option<InputName> {
    if let Some(button) = parse_mouse_button(name) {
        return Some(InputName::Mouse(button));
    }
    KeyCode::from_name(name).map(InputName::Key)
}

fn parse_mouse_button(name: &str) -> Option<MouseButton> {
    let prefix = name.get(..5)?;
    if !prefix.eq_ignore_ascii_case("mouse") {
        return None;
    }
    let suffix = &name[5..];
    if suffix.is_empty() {
        return Some(MouseButton::LEFT);
    }
    let index = suffix.parse::<u8>().ok()?;
    Some(MouseButton::new(index.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: KeyCode = KeyCode::Character('K');

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            KeyCode::from_name("Space"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("a"), Some(KeyCode::Character('A')));
        assert_eq!(KeyCode::from_name("F12"), Some(KeyCode::Function(12)));
        assert_eq!(KeyCode::from_name("ab"), None);
    }

    #[test]
    fn maps_dom_key_codes() {
        assert_eq!(KeyCode::from_dom_key_code(87), Some(KeyCode::Character('W')));
        assert_eq!(KeyCode::from_dom_key_code(53), Some(KeyCode::Digit(5)));
        assert_eq!(KeyCode::from_dom_key_code(112), Some(KeyCode::Function(1)));
        assert_eq!(
            KeyCode::from_dom_key_code(38),
            Some(KeyCode::Named(NamedKey::Up))
        );
        assert_eq!(KeyCode::from_dom_key_code(255), None);
    }

    #[test]
    fn mouse_names_are_supported() {
        assert_eq!(mouse_index("Mouse1"), 0);
        assert_eq!(mouse_index("mouse3"), 2);
        assert!(parse_mouse_button("Mo").is_none());
    }

    fn mouse_index(name: &str) -> u8 {
        match parse_input_name(name).unwrap() {
            InputName::Mouse(button) => button.index(),
            InputName::Key(_) => panic!("expected mouse button"),
        }
    }

    #[test]
    fn key_edges_last_exactly_one_frame() {
        let sink = InputSink::new();
        let mut input = InputState::new();

        sink.key_up(K);
        input.advance(&sink, 0.016);
        assert!(!input.keyboard.key(K));

        sink.key_down(K);
        input.advance(&sink, 0.016);
        assert!(input.keyboard.key_down(K));
        assert!(input.keyboard.key(K));

        input.advance(&sink, 0.016);
        assert!(!input.keyboard.key_down(K));
        assert!(input.keyboard.key(K));

        sink.key_up(K);
        input.advance(&sink, 0.016);
        assert!(input.keyboard.key_up(K));
        assert!(!input.keyboard.key(K));

        input.advance(&sink, 0.016);
        assert!(!input.keyboard.key_up(K));
    }

    #[test]
    fn events_between_advances_are_invisible_until_the_next_frame() {
        let sink = InputSink::new();
        let mut input = InputState::new();
        sink.key_down(K);
        assert!(!input.keyboard.key(K));
        input.advance(&sink, 0.016);
        assert!(input.held_by_name("K"));
    }

    #[test]
    fn mouse_tracks_buttons_and_motion() {
        let sink = InputSink::new();
        let mut input = InputState::new();

        sink.mouse_move(Vec2::new(10.0, 20.0));
        sink.mouse_down(MouseButton::RIGHT);
        input.advance(&sink, 0.016);
        assert!(input.mouse.button_down(MouseButton::RIGHT));
        assert!(!input.mouse.button(MouseButton::LEFT));
        assert_eq!(input.mouse.delta(), Vec2::new(10.0, 20.0));

        sink.mouse_move(Vec2::new(15.0, 20.0));
        sink.mouse_up(MouseButton::RIGHT);
        input.advance(&sink, 0.016);
        assert!(input.mouse.button_up(MouseButton::RIGHT));
        assert_eq!(input.mouse.position(), Vec2::new(15.0, 20.0));
        assert_eq!(input.mouse.delta(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn sink_clones_share_pending_state() {
        let sink = InputSink::new();
        let writer = sink.clone();
        let mut input = InputState::new();
        writer.mouse_down(MouseButton::LEFT);
        input.advance(&sink, 0.016);
        assert!(input.held_by_name("Mouse"));
    }
}
