use glam::Vec4;
use serde::{Deserialize, Serialize};

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);
    pub const SOLID_BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const SOLID_WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT_BLACK: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const TRANSPARENT_WHITE: Self = Self::new(1.0, 1.0, 1.0, 0.0);
    pub const CORNFLOWER_BLUE: Self = Self::from_ints(100, 149, 237, 255);
    pub const UNITY_BLUE: Self = Self::from_ints(49, 77, 121, 255);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from 8-bit channels.
    pub const fn from_ints(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::SOLID_WHITE
    }
}

impl From<Color> for Vec4 {
    fn from(color: Color) -> Self {
        color.to_vec4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_come_from_byte_channels() {
        assert_eq!(Color::UNITY_BLUE.to_vec4(), Vec4::new(49.0, 77.0, 121.0, 255.0) / 255.0);
        assert_eq!(Color::CORNFLOWER_BLUE.a, 1.0);
        assert_eq!(Color::TRANSPARENT_WHITE.a, 0.0);
    }
}
