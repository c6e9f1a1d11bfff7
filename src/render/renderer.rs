use std::sync::Arc;

use anyhow::Result;

use super::{DrawCommand, Material, Mesh, MeshDraw, MODEL_MATRIX, PROJECTION_MATRIX, VIEW_MATRIX};
use crate::behavior::{Behavior, BehaviorKind, FrameContext};

/// Draws a mesh with the entity's scaled model matrix.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: Arc<Mesh>,
    pub material: Material,
}

impl MeshRenderer {
    pub fn new(mesh: Arc<Mesh>, material: Material) -> Self {
        Self { mesh, material }
    }
}

impl Behavior for MeshRenderer {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Renderer
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let Some(view) = ctx.camera_view().copied() else {
            return Ok(());
        };
        self.material.set_matrix(VIEW_MATRIX, view.view);
        self.material.set_matrix(PROJECTION_MATRIX, view.projection);
        self.material
            .set_matrix(MODEL_MATRIX, ctx.transform().scaled_model_matrix());

        ctx.submit(DrawCommand::Mesh(MeshDraw {
            entity: ctx.entity(),
            mesh: Arc::clone(&self.mesh),
            material: self.material.clone(),
        }));
        Ok(())
    }
}
