use anyhow::Result;
use glam::Vec2;
use log::debug;

use super::{BodyDef, BodyHandle, BodyType};
use crate::behavior::{AwakeContext, Behavior, BehaviorKind, FrameContext};

/// Puts the entity under control of the physics world.
///
/// Colliders on this entity or its descendants attach their fixtures to the
/// body created here.
#[derive(Debug, Clone, Default)]
pub struct RigidBody {
    pub body_type: BodyType,
    def: Option<BodyDef>,
    body: Option<BodyHandle>,
}

impl RigidBody {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            def: None,
            body: None,
        }
    }

    /// Definition captured at attach time.
    pub fn body_def(&self) -> Option<&BodyDef> {
        self.def.as_ref()
    }

    /// Handle of the live body, once the entity has started.
    pub fn handle(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Sets the body's velocity. Does nothing before the body exists.
    pub fn set_velocity(&self, ctx: &mut FrameContext<'_>, velocity: Vec2) -> bool {
        match self.body {
            Some(body) => ctx.physics().set_linear_velocity(body, velocity),
            None => false,
        }
    }

    pub fn apply_force(&self, ctx: &mut FrameContext<'_>, force: Vec2) -> bool {
        match self.body {
            Some(body) => ctx.physics().apply_force(body, force),
            None => false,
        }
    }
}

impl Behavior for RigidBody {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::RigidBody
    }

    fn awake(&mut self, ctx: &mut AwakeContext<'_>) -> Result<()> {
        let transform = ctx.transform();
        self.def = Some(BodyDef {
            body_type: self.body_type,
            position: transform.position().truncate(),
            angle: transform.euler_angles().z,
        });
        Ok(())
    }

    fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let def = self.def.unwrap_or(BodyDef {
            body_type: self.body_type,
            ..BodyDef::default()
        });
        let body = ctx.physics().create_body(&def);

        // The entity may have moved between attach and start.
        let position = ctx.position().truncate();
        let angle = ctx.transform().euler_angles().z;
        ctx.physics().set_body_transform(body, position, angle);
        debug!("{}: created {:?} body {body:?}", ctx.entity_name(), def.body_type);
        self.body = Some(body);
        Ok(())
    }

    fn on_destroy(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(body) = self.body.take() {
            ctx.physics().destroy_body(body);
        }
    }
}
