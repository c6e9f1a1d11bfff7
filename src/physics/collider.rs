use anyhow::Result;
use glam::{Vec2, Vec3};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::{BodyHandle, FixtureDef, FixtureHandle, RigidBody, Shape};
use crate::behavior::{AwakeContext, Behavior, BehaviorId, BehaviorKind, FrameContext};

pub const RESTITUTION: f32 = 0.5;
pub const DENSITY: f32 = 0.05;
pub const FRICTION: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { center: Vec2, size: Vec2 },
    Circle { radius: f32 },
}

impl ColliderShape {
    fn to_shape(self) -> Shape {
        match self {
            ColliderShape::Box { center, size } => Shape::Box {
                center,
                half_extents: size * 0.5,
            },
            ColliderShape::Circle { radius } => Shape::Circle {
                center: Vec2::ZERO,
                radius,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Attachment {
    /// Start has not run yet.
    Detached,
    /// A rigid body was found but its body is not created yet.
    Pending(BehaviorId),
    Attached {
        body: BodyHandle,
        fixture: FixtureHandle,
    },
    /// No rigid body anywhere up the hierarchy.
    Inert,
}

/// Gives the nearest rigid body a fixture and keeps the entity's transform
/// in sync with it.
///
/// The body is looked up on the collider's own entity first, then on each
/// ancestor in turn. Without one the collider logs an error once and does
/// nothing afterwards.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: ColliderShape,
    pub is_sensor: bool,
    def: Option<FixtureDef>,
    attachment: Attachment,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_sensor: false,
            def: None,
            attachment: Attachment::Detached,
        }
    }

    /// Unit box centred on the entity.
    pub fn boxed() -> Self {
        Self::new(ColliderShape::Box {
            center: Vec2::ZERO,
            size: Vec2::ONE,
        })
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(ColliderShape::Circle { radius })
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    pub fn fixture_def(&self) -> Option<&FixtureDef> {
        self.def.as_ref()
    }

    pub fn body(&self) -> Option<BodyHandle> {
        match self.attachment {
            Attachment::Attached { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn fixture(&self) -> Option<FixtureHandle> {
        match self.attachment {
            Attachment::Attached { fixture, .. } => Some(fixture),
            _ => None,
        }
    }

    /// True when no rigid body could be found at start.
    pub fn is_inert(&self) -> bool {
        self.attachment == Attachment::Inert
    }

    fn try_attach(&mut self, ctx: &mut FrameContext<'_>) {
        let Attachment::Pending(rigid_body) = self.attachment else {
            return;
        };
        let Some(body) = ctx
            .behavior::<RigidBody>(rigid_body)
            .and_then(RigidBody::handle)
        else {
            return;
        };
        let def = self.def.unwrap_or_else(|| self.build_def());
        match ctx.physics().create_fixture(body, &def) {
            Some(fixture) => {
                debug!("{}: fixture {fixture:?} on body {body:?}", ctx.entity_name());
                self.attachment = Attachment::Attached { body, fixture };
            }
            None => {
                error!("{}: rigid body {body:?} no longer exists", ctx.entity_name());
                self.attachment = Attachment::Inert;
            }
        }
    }

    fn build_def(&self) -> FixtureDef {
        FixtureDef {
            shape: self.shape.to_shape(),
            restitution: RESTITUTION,
            density: DENSITY,
            friction: FRICTION,
            is_sensor: self.is_sensor,
        }
    }
}

impl Behavior for Collider {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Collider
    }

    fn awake(&mut self, _ctx: &mut AwakeContext<'_>) -> Result<()> {
        self.def = Some(self.build_def());
        Ok(())
    }

    fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.attachment = match ctx.rigid_body_in_ancestors() {
            Some(rigid_body) => Attachment::Pending(rigid_body),
            None => {
                error!(
                    "{}: a collider needs a RigidBody on its entity or an ancestor",
                    ctx.entity_name()
                );
                Attachment::Inert
            }
        };
        self.try_attach(ctx);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.try_attach(ctx);
        let Attachment::Attached { body, .. } = self.attachment else {
            return Ok(());
        };

        let (Some(position), Some(angle)) =
            (ctx.physics().body_position(body), ctx.physics().body_angle(body))
        else {
            return Ok(());
        };
        let z = ctx.position().z;
        ctx.set_position(Vec3::new(position.x, position.y, z));
        if let Some(transform) = ctx.transform_mut() {
            let euler = transform.euler_angles();
            transform.set_euler_angles(Vec3::new(euler.x, euler.y, angle));
        }

        let entity = ctx.entity();
        for contact in ctx.physics().contacts(body) {
            if contact.touching {
                ctx.broadcast_collision(entity, contact);
            }
        }
        Ok(())
    }
}
