//! Draw submission.
//!
//! Behaviors describe what to draw as [`DrawCommand`]s collected into a
//! [`DrawList`] each frame. Turning those commands into GPU work belongs to
//! the host; the crate stops at the list.

mod material;
mod mesh;
mod renderer;

pub use material::{Material, Uniform, COLOR, MODEL_MATRIX, PROJECTION_MATRIX, VIEW_MATRIX};
pub use mesh::Mesh;
pub use renderer::MeshRenderer;

use std::sync::Arc;

use crate::entity::EntityId;
use crate::math::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear color and depth before a camera's pass.
    Clear(Color),
    Mesh(MeshDraw),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw {
    pub entity: EntityId,
    pub mesh: Arc<Mesh>,
    pub material: Material,
}

/// Commands submitted during one render pass, in submission order.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshDraw> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Mesh(draw) => Some(draw),
            DrawCommand::Clear(_) => None,
        })
    }
}
