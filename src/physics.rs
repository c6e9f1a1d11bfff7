//! Boundary to the 2-D physics solver.
//!
//! The scene owns one [`PhysicsWorld`] and steps it once per frame before
//! entity updates. [`BasicWorld`] is a small reference implementation:
//! it integrates gravity and reports overlapping fixtures as contacts, but
//! does not resolve collisions. A full solver plugs in through
//! [`PhysicsFactory`].

mod collider;
mod joint;
mod rigid_body;

pub use collider::{Collider, ColliderShape};
pub use joint::RevoluteJoint;
pub use rigid_body::RigidBody;

use glam::Vec2;
use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wraps an id issued by a [`PhysicsWorld`] implementation.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// A body owned by a [`PhysicsWorld`].
    BodyHandle
);
handle!(FixtureHandle);
handle!(JointHandle);

/// Static bodies never move; kinematic bodies move at their set velocity;
/// dynamic bodies respond to gravity and forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    Static,
    Kinematic,
    #[default]
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { center: Vec2, half_extents: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl Shape {
    fn area(&self) -> f32 {
        match *self {
            Shape::Box { half_extents, .. } => 4.0 * half_extents.x * half_extents.y,
            Shape::Circle { radius, .. } => std::f32::consts::PI * radius * radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixtureDef {
    pub shape: Shape,
    pub restitution: f32,
    pub density: f32,
    pub friction: f32,
    pub is_sensor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevoluteJointDef {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub anchor: Vec2,
    pub enable_motor: bool,
}

/// A pair of fixtures whose bounds overlap, seen from `body_a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub fixture_a: FixtureHandle,
    pub fixture_b: FixtureHandle,
    pub touching: bool,
    /// Unit vector from `body_a` toward `body_b`.
    pub normal: Vec2,
}

pub trait PhysicsWorld {
    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32);
    fn clear_forces(&mut self);

    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;
    /// Returns `false` when the body was already gone.
    fn destroy_body(&mut self, body: BodyHandle) -> bool;
    fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> Option<FixtureHandle>;
    fn create_joint(&mut self, def: &RevoluteJointDef) -> Option<JointHandle>;

    fn set_body_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) -> bool;
    fn body_position(&self, body: BodyHandle) -> Option<Vec2>;
    fn body_angle(&self, body: BodyHandle) -> Option<f32>;
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> bool;
    fn apply_force(&mut self, body: BodyHandle, force: Vec2) -> bool;

    /// Contacts involving `body`, with `body` as `body_a`.
    fn contacts(&self, body: BodyHandle) -> Vec<Contact>;
}

/// Builds a fresh world for the given gravity.
pub type PhysicsFactory = Box<dyn Fn(Vec2) -> Box<dyn PhysicsWorld>>;

pub fn basic_world_factory() -> PhysicsFactory {
    Box::new(|gravity| Box::new(BasicWorld::new(gravity)))
}

#[derive(Debug, Clone)]
struct Body {
    def: BodyDef,
    velocity: Vec2,
    force: Vec2,
    fixtures: Vec<FixtureHandle>,
}

#[derive(Debug, Clone)]
struct Fixture {
    body: BodyHandle,
    def: FixtureDef,
}

#[derive(Debug, Clone)]
pub struct BasicWorld {
    gravity: Vec2,
    bodies: Vec<Option<Body>>,
    fixtures: Vec<Option<Fixture>>,
    joints: Vec<RevoluteJointDef>,
    contacts: Vec<Contact>,
    steps: u64,
}

impl BasicWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            fixtures: Vec::new(),
            joints: Vec::new(),
            contacts: Vec::new(),
            steps: 0,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0 as usize)?.as_ref()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.0 as usize)?.as_mut()
    }

    fn mass(&self, body: &Body) -> f32 {
        let mass: f32 = body
            .fixtures
            .iter()
            .filter_map(|handle| self.fixtures.get(handle.0 as usize)?.as_ref())
            .map(|fixture| fixture.def.density * fixture.def.shape.area())
            .sum();
        if mass > 0.0 {
            mass
        } else {
            1.0
        }
    }

    /// World-space bounds of a fixture, ignoring body rotation.
    fn fixture_bounds(&self, fixture: &Fixture) -> Option<(Vec2, Vec2)> {
        let origin = self.body(fixture.body)?.def.position;
        Some(match fixture.def.shape {
            Shape::Box {
                center,
                half_extents,
            } => (origin + center - half_extents, origin + center + half_extents),
            Shape::Circle { center, radius } => (
                origin + center - Vec2::splat(radius),
                origin + center + Vec2::splat(radius),
            ),
        })
    }

    fn overlaps(&self, a: &Fixture, b: &Fixture) -> bool {
        if let (Shape::Circle { center: ca, radius: ra }, Shape::Circle { center: cb, radius: rb }) =
            (a.def.shape, b.def.shape)
        {
            let (Some(pa), Some(pb)) = (self.body_position(a.body), self.body_position(b.body))
            else {
                return false;
            };
            return (pa + ca).distance(pb + cb) <= ra + rb;
        }
        match (self.fixture_bounds(a), self.fixture_bounds(b)) {
            (Some((min_a, max_a)), Some((min_b, max_b))) => {
                min_a.cmple(max_b).all() && max_a.cmpge(min_b).all()
            }
            _ => false,
        }
    }

    fn find_contacts(&mut self) {
        let mut contacts = Vec::new();
        let live: Vec<(usize, &Fixture)> = self
            .fixtures
            .iter()
            .enumerate()
            .filter_map(|(index, fixture)| Some((index, fixture.as_ref()?)))
            .collect();
        for (i, &(index_a, a)) in live.iter().enumerate() {
            for &(index_b, b) in &live[i + 1..] {
                if a.body == b.body || !self.overlaps(a, b) {
                    continue;
                }
                let (Some(pa), Some(pb)) = (self.body_position(a.body), self.body_position(b.body))
                else {
                    continue;
                };
                contacts.push(Contact {
                    body_a: a.body,
                    body_b: b.body,
                    fixture_a: FixtureHandle(index_a as u32),
                    fixture_b: FixtureHandle(index_b as u32),
                    touching: !(a.def.is_sensor || b.def.is_sensor),
                    normal: (pb - pa).normalize_or_zero(),
                });
            }
        }
        self.contacts = contacts;
    }
}

impl PhysicsWorld for BasicWorld {
    fn step(&mut self, dt: f32, _velocity_iterations: u32, _position_iterations: u32) {
        let masses: Vec<f32> = self
            .bodies
            .iter()
            .map(|body| body.as_ref().map_or(1.0, |body| self.mass(body)))
            .collect();
        let gravity = self.gravity;
        for (body, mass) in self.bodies.iter_mut().zip(masses) {
            let Some(body) = body else { continue };
            match body.def.body_type {
                BodyType::Static => continue,
                BodyType::Kinematic => {}
                BodyType::Dynamic => body.velocity += (gravity + body.force / mass) * dt,
            }
            body.def.position += body.velocity * dt;
        }
        self.steps += 1;
        self.find_contacts();
    }

    fn clear_forces(&mut self) {
        for body in self.bodies.iter_mut().flatten() {
            body.force = Vec2::ZERO;
        }
    }

    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(Body {
            def: *def,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            fixtures: Vec::new(),
        }));
        handle
    }

    fn destroy_body(&mut self, body: BodyHandle) -> bool {
        let Some(removed) = self.bodies.get_mut(body.0 as usize).and_then(Option::take) else {
            return false;
        };
        for fixture in removed.fixtures {
            if let Some(slot) = self.fixtures.get_mut(fixture.0 as usize) {
                *slot = None;
            }
        }
        self.joints
            .retain(|joint| joint.body_a != body && joint.body_b != body);
        self.contacts
            .retain(|contact| contact.body_a != body && contact.body_b != body);
        true
    }

    fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> Option<FixtureHandle> {
        let handle = FixtureHandle(self.fixtures.len() as u32);
        self.body_mut(body)?.fixtures.push(handle);
        self.fixtures.push(Some(Fixture { body, def: *def }));
        Some(handle)
    }

    fn create_joint(&mut self, def: &RevoluteJointDef) -> Option<JointHandle> {
        self.body(def.body_a)?;
        self.body(def.body_b)?;
        self.joints.push(*def);
        Some(JointHandle(self.joints.len() as u32 - 1))
    }

    fn set_body_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) -> bool {
        let Some(body) = self.body_mut(body) else {
            return false;
        };
        body.def.position = position;
        body.def.angle = angle;
        true
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec2> {
        Some(self.body(body)?.def.position)
    }

    fn body_angle(&self, body: BodyHandle) -> Option<f32> {
        Some(self.body(body)?.def.angle)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> bool {
        let Some(body) = self.body_mut(body) else {
            return false;
        };
        body.velocity = velocity;
        true
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2) -> bool {
        let Some(body) = self.body_mut(body) else {
            return false;
        };
        body.force += force;
        true
    }

    fn contacts(&self, body: BodyHandle) -> Vec<Contact> {
        self.contacts
            .iter()
            .filter_map(|contact| {
                if contact.body_a == body {
                    Some(*contact)
                } else if contact.body_b == body {
                    Some(Contact {
                        body_a: contact.body_b,
                        body_b: contact.body_a,
                        fixture_a: contact.fixture_b,
                        fixture_b: contact.fixture_a,
                        touching: contact.touching,
                        normal: -contact.normal,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(radius: f32) -> FixtureDef {
        FixtureDef {
            shape: Shape::Circle {
                center: Vec2::ZERO,
                radius,
            },
            restitution: 0.5,
            density: 0.05,
            friction: 0.2,
            is_sensor: false,
        }
    }

    #[test]
    fn dynamic_bodies_fall_and_static_bodies_stay() {
        let mut world = BasicWorld::new(Vec2::new(0.0, -9.8));
        let falling = world.create_body(&BodyDef::default());
        let ground = world.create_body(&BodyDef {
            body_type: BodyType::Static,
            ..BodyDef::default()
        });
        world.step(1.0 / 60.0, 10, 10);
        world.clear_forces();
        assert!(world.body_position(falling).expect("alive").y < 0.0);
        assert_eq!(world.body_position(ground), Some(Vec2::ZERO));
        assert_eq!(world.step_count(), 1);
    }

    #[test]
    fn overlapping_fixtures_report_contacts_from_both_sides() {
        let mut world = BasicWorld::new(Vec2::ZERO);
        let a = world.create_body(&BodyDef::default());
        let b = world.create_body(&BodyDef {
            position: Vec2::new(1.5, 0.0),
            ..BodyDef::default()
        });
        world.create_fixture(a, &circle(1.0)).expect("body a exists");
        world.create_fixture(b, &circle(1.0)).expect("body b exists");
        world.step(0.0, 1, 1);

        let from_a = world.contacts(a);
        assert_eq!(from_a.len(), 1);
        assert!(from_a[0].touching);
        assert_eq!(from_a[0].normal, Vec2::X);

        let from_b = world.contacts(b);
        assert_eq!(from_b[0].body_a, b);
        assert_eq!(from_b[0].normal, -Vec2::X);
    }

    #[test]
    fn destroyed_bodies_drop_fixtures_and_joints() {
        let mut world = BasicWorld::new(Vec2::ZERO);
        let a = world.create_body(&BodyDef::default());
        let b = world.create_body(&BodyDef::default());
        world.create_fixture(a, &circle(1.0));
        world
            .create_joint(&RevoluteJointDef {
                body_a: a,
                body_b: b,
                anchor: Vec2::ZERO,
                enable_motor: false,
            })
            .expect("both bodies exist");
        assert!(world.destroy_body(a));
        assert!(!world.destroy_body(a));
        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.body_count(), 1);
        assert!(world.create_fixture(a, &circle(1.0)).is_none());
    }
}
