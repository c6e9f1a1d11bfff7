use anyhow::{anyhow, Result};
use glam::Vec2;

use super::{JointHandle, RevoluteJointDef, RigidBody};
use crate::behavior::{Behavior, FrameContext};
use crate::entity::EntityId;

/// Pins this entity's rigid body to the one on `connected` around `anchor`.
///
/// Both bodies must exist when this behavior starts, so `connected` has to
/// join the scene first.
#[derive(Debug, Clone)]
pub struct RevoluteJoint {
    pub connected: EntityId,
    pub anchor: Vec2,
    pub enable_motor: bool,
    def: Option<RevoluteJointDef>,
    joint: Option<JointHandle>,
}

impl RevoluteJoint {
    pub fn new(connected: EntityId, anchor: Vec2) -> Self {
        Self {
            connected,
            anchor,
            enable_motor: false,
            def: None,
            joint: None,
        }
    }

    pub fn handle(&self) -> Option<JointHandle> {
        self.joint
    }

    /// The definition handed to the physics world, once both bodies were
    /// found.
    pub fn def(&self) -> Option<&RevoluteJointDef> {
        self.def.as_ref()
    }
}

impl Behavior for RevoluteJoint {
    fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let own = ctx
            .find_behavior::<RigidBody>(ctx.entity())
            .and_then(|id| ctx.behavior::<RigidBody>(id))
            .and_then(RigidBody::handle)
            .ok_or_else(|| anyhow!("{} has no started RigidBody", ctx.entity_name()))?;
        let other = ctx
            .find_behavior::<RigidBody>(self.connected)
            .and_then(|id| ctx.behavior::<RigidBody>(id))
            .and_then(RigidBody::handle)
            .ok_or_else(|| anyhow!("connected entity {} has no started RigidBody", self.connected))?;

        let def = RevoluteJointDef {
            body_a: own,
            body_b: other,
            anchor: self.anchor,
            enable_motor: self.enable_motor,
        };
        self.joint = ctx.physics().create_joint(&def);
        self.def = Some(def);
        Ok(())
    }
}
