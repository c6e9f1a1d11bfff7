//! Host helpers shared by the native binary and the browser glue.

use winit::event::{MouseButton as WinitMouseButton, VirtualKeyCode};

use crate::input::{KeyCode, MouseButton, NamedKey};
use crate::pong::{Ball, PongHandles};
use crate::scene::Scene;

/// Prints the entity listing shown right after the scene is built.
pub fn print_scene_listing(scene: &Scene) {
    println!(
        "Loaded scene with {} entities ({} cameras)",
        scene.len(),
        scene.cameras().len()
    );
    for (_, entity) in scene.entities() {
        println!(" - {} ({} behaviors)", entity.name(), entity.behavior_count());
    }
}

/// Final positions of every entity followed by the score line.
pub fn print_summary(scene: &Scene, handles: &PongHandles) {
    println!("Final entity states:");
    for (_, entity) in scene.entities() {
        let position = entity.transform().position();
        println!(
            " - {} pos=({:.2}, {:.2}, {:.2})",
            entity.name(),
            position.x,
            position.y,
            position.z
        );
    }
    if let Some((score1, score2)) = score(scene, handles) {
        println!("Final score: {score1} - {score2}");
    }
}

pub fn score(scene: &Scene, handles: &PongHandles) -> Option<(u32, u32)> {
    scene
        .behavior::<Ball>(handles.ball)
        .map(|ball| (ball.score1, ball.score2))
}

pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::LEFT,
        WinitMouseButton::Middle => MouseButton::MIDDLE,
        WinitMouseButton::Right => MouseButton::RIGHT,
        WinitMouseButton::Other(value) => MouseButton::new(value.min(u16::from(u8::MAX)) as u8),
    }
}

/// Maps a winit key onto the engine's key set. Letters, digits and F1-F12
/// are contiguous in `VirtualKeyCode`, so they are resolved by offset.
pub fn map_keycode(code: VirtualKeyCode) -> Option<KeyCode> {
    use VirtualKeyCode as Key;
    let offset = |first: Key| (code as u32).checked_sub(first as u32);

    if let Some(letter) = offset(Key::A).filter(|&n| n < 26) {
        return char::from_u32('A' as u32 + letter).map(KeyCode::Character);
    }
    // Key1..=Key9 come first, Key0 last.
    if let Some(n) = offset(Key::Key1).filter(|&n| n < 10) {
        return Some(KeyCode::Digit(((n + 1) % 10) as u8));
    }
    if let Some(n) = offset(Key::F1).filter(|&n| n < 12) {
        return Some(KeyCode::Function(n as u8 + 1));
    }

    let named = match code {
        Key::Space => NamedKey::Space,
        Key::Return => NamedKey::Enter,
        Key::Tab => NamedKey::Tab,
        Key::Left => NamedKey::Left,
        Key::Right => NamedKey::Right,
        Key::Up => NamedKey::Up,
        Key::Down => NamedKey::Down,
        Key::Escape => NamedKey::Escape,
        Key::Back => NamedKey::Backspace,
        Key::Home => NamedKey::Home,
        Key::End => NamedKey::End,
        Key::PageUp => NamedKey::PageUp,
        Key::PageDown => NamedKey::PageDown,
        Key::LShift => NamedKey::LeftShift,
        Key::RShift => NamedKey::RightShift,
        Key::LControl => NamedKey::LeftCtrl,
        Key::RControl => NamedKey::RightCtrl,
        Key::LAlt => NamedKey::LeftAlt,
        Key::RAlt => NamedKey::RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(named))
}
