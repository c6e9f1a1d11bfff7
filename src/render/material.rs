use std::collections::BTreeMap;

use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

use crate::math::Color;

pub const VIEW_MATRIX: &str = "uViewMatrix";
pub const PROJECTION_MATRIX: &str = "uProjectionMatrix";
pub const MODEL_MATRIX: &str = "uModelMatrix";
pub const COLOR: &str = "uColor";

/// Value bound to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Uniform {
    Matrix(Mat4),
    Vector(Vec4),
    Float(f32),
}

/// Shader reference plus the uniform values to draw it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub shader: String,
    uniforms: BTreeMap<String, Uniform>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("shaders/white.glsl")
    }
}

impl Material {
    pub fn new(shader: impl Into<String>) -> Self {
        let mut material = Self {
            shader: shader.into(),
            uniforms: BTreeMap::new(),
        };
        material.set_color(COLOR, Color::SOLID_WHITE);
        material
    }

    pub fn set_matrix(&mut self, name: &str, matrix: Mat4) {
        self.uniforms.insert(name.to_string(), Uniform::Matrix(matrix));
    }

    pub fn set_color(&mut self, name: &str, color: Color) {
        self.uniforms
            .insert(name.to_string(), Uniform::Vector(color.to_vec4()));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.insert(name.to_string(), Uniform::Float(value));
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        match self.uniforms.get(name)? {
            Uniform::Matrix(matrix) => Some(*matrix),
            _ => None,
        }
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &Uniform)> {
        self.uniforms.iter().map(|(name, value)| (name.as_str(), value))
    }
}
