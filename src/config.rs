use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::Color;
use crate::viewport::Viewport;

/// Scene-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: Viewport,
    /// Gravity handed to the physics world factory.
    pub gravity: Vec2,
    /// Physics step length in seconds.
    pub fixed_delta: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Background for cameras created through the scene helpers.
    pub background: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            gravity: Vec2::new(0.0, -9.8),
            fixed_delta: 1.0 / 60.0,
            velocity_iterations: 10,
            position_iterations: 10,
            background: Color::UNITY_BLUE,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `VAPOR_WIDTH`, `VAPOR_HEIGHT` and
    /// `VAPOR_FIXED_DELTA` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let width = parse_var(&lookup, "VAPOR_WIDTH", "a positive integer")?
            .unwrap_or(config.viewport.width);
        let height = parse_var(&lookup, "VAPOR_HEIGHT", "a positive integer")?
            .unwrap_or(config.viewport.height);
        config.viewport = Viewport::new(width, height);

        if let Some(delta) = parse_var::<f32>(&lookup, "VAPOR_FIXED_DELTA", "a positive number")? {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name: "VAPOR_FIXED_DELTA",
                    expected: "a positive number",
                    value: delta.to_string(),
                });
            }
            config.fixed_delta = delta;
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            name,
            expected,
            value: raw,
        })
}
