//! Scene nodes and their identifiers.
//!
//! Identifiers are generational: a slot freed by a removed entity can be
//! reused, but ids handed out for the old occupant stop resolving.

use std::sync::Arc;

use glam::Vec3;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::behavior::{downcast_mut, downcast_ref, AwakeContext, Behavior, BehaviorKind};
use crate::camera::Camera;
use crate::render::{Material, Mesh, MeshRenderer};
use crate::transform::Transform;
use crate::viewport::Viewport;

/// Identifier of an entity inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

pub(crate) struct BehaviorSlot {
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) enabled: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct WellKnownSlots {
    camera: Option<usize>,
    renderer: Option<usize>,
    rigid_body: Option<usize>,
    collider: Option<usize>,
}

/// A named node owning a transform, an ordered behavior list and links to
/// its parent and children.
pub struct Entity {
    name: String,
    transform: Transform,
    behaviors: Vec<BehaviorSlot>,
    slots: WellKnownSlots,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) started: bool,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .behaviors
            .iter()
            .map(|slot| slot.behavior.as_deref().map_or("<running>", |b| b.name()))
            .collect();
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("position", &self.transform.position())
            .field("behaviors", &names)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            behaviors: Vec::new(),
            slots: WellKnownSlots::default(),
            parent: None,
            children: Vec::new(),
            started: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.set_translation(position);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.set_scale(scale);
        self
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Attaches `behavior` and runs its Awake hook right away.
    ///
    /// Returns the behavior's index in attach order. A second behavior of a
    /// well-known kind takes over the entity's slot for that kind; both stay
    /// in the behavior list.
    ///
    /// Meant for building an entity before it joins a scene. Once it is in
    /// one, use [`Scene::add_behavior`](crate::scene::Scene::add_behavior)
    /// so the scene registers cameras right away.
    pub fn add_behavior<B: Behavior>(&mut self, behavior: B) -> usize {
        self.add_boxed(Box::new(behavior))
    }

    pub fn add_boxed(&mut self, mut behavior: Box<dyn Behavior>) -> usize {
        let index = self.behaviors.len();
        match behavior.kind() {
            BehaviorKind::Camera => self.slots.camera = Some(index),
            BehaviorKind::Renderer => self.slots.renderer = Some(index),
            BehaviorKind::RigidBody => self.slots.rigid_body = Some(index),
            BehaviorKind::Collider => self.slots.collider = Some(index),
            BehaviorKind::Script => {}
        }

        let mut ctx = AwakeContext {
            entity_name: &self.name,
            transform: &mut self.transform,
        };
        if let Err(err) = behavior.awake(&mut ctx) {
            error!("{}/{} failed during awake: {err:?}", self.name, behavior.name());
        }
        debug!("attached {} to {} at index {index}", behavior.name(), self.name);

        self.behaviors.push(BehaviorSlot {
            behavior: Some(behavior),
            enabled: true,
        });
        index
    }

    pub fn with_behavior<B: Behavior>(mut self, behavior: B) -> Self {
        self.add_behavior(behavior);
        self
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Behaviors in attach order. A behavior whose hook is currently running
    /// is skipped.
    pub fn behaviors(&self) -> impl Iterator<Item = &(dyn Behavior + 'static)> {
        self.behaviors.iter().filter_map(|slot| slot.behavior.as_deref())
    }

    pub fn behavior(&self, index: usize) -> Option<&(dyn Behavior + 'static)> {
        self.behaviors.get(index)?.behavior.as_deref()
    }

    pub fn behavior_mut(&mut self, index: usize) -> Option<&mut (dyn Behavior + 'static)> {
        self.behaviors.get_mut(index)?.behavior.as_deref_mut()
    }

    pub fn get<T: Behavior>(&self, index: usize) -> Option<&T> {
        self.behavior(index).and_then(downcast_ref::<T>)
    }

    pub fn get_mut<T: Behavior>(&mut self, index: usize) -> Option<&mut T> {
        self.behavior_mut(index).and_then(downcast_mut::<T>)
    }

    /// Index of the first behavior of type `T`.
    pub fn find_behavior<T: Behavior>(&self) -> Option<usize> {
        self.behaviors.iter().position(|slot| {
            slot.behavior
                .as_deref()
                .is_some_and(|b| downcast_ref::<T>(b).is_some())
        })
    }

    /// Index of the first behavior reporting `name`.
    pub fn find_behavior_by_name(&self, name: &str) -> Option<usize> {
        self.behaviors.iter().position(|slot| {
            slot.behavior
                .as_deref()
                .is_some_and(|b| b.name() == name)
        })
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.behaviors.get(index).is_some_and(|slot| slot.enabled)
    }

    /// Disabled behaviors are skipped by Update and Render. Awake, Start and
    /// collision callbacks ignore the flag.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(slot) = self.behaviors.get_mut(index) {
            slot.enabled = enabled;
        }
    }

    pub fn camera(&self) -> Option<usize> {
        self.slots.camera
    }

    pub fn renderer(&self) -> Option<usize> {
        self.slots.renderer
    }

    pub fn rigid_body(&self) -> Option<usize> {
        self.slots.rigid_body
    }

    pub fn collider(&self) -> Option<usize> {
        self.slots.collider
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut BehaviorSlot> {
        self.behaviors.get_mut(index)
    }

    pub(crate) fn camera_indices(&self) -> Vec<usize> {
        self.behaviors
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.behavior
                    .as_deref()
                    .is_some_and(|b| b.kind() == BehaviorKind::Camera)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// An entity carrying a [`Camera`] sized for `viewport`.
    pub fn create_camera(viewport: Viewport) -> Self {
        let mut entity = Entity::new("Camera");
        entity.add_behavior(Camera::new(viewport));
        entity
    }

    pub fn create_quad() -> Self {
        Self::with_mesh("Quad", Mesh::quad())
    }

    pub fn create_triangle() -> Self {
        Self::with_mesh("Triangle", Mesh::triangle())
    }

    pub fn create_line(points: &[Vec3], width: f32) -> Self {
        Self::with_mesh("Line", Mesh::line(points, width))
    }

    pub fn create_circle(radius: f32, segments: u32, start_angle: f32, angular_size: f32) -> Self {
        Self::with_mesh(
            "Circle",
            Mesh::circle(radius, segments, start_angle, angular_size),
        )
    }

    fn with_mesh(name: &str, mesh: Mesh) -> Self {
        let mut entity = Entity::new(name);
        entity.add_behavior(MeshRenderer::new(Arc::new(mesh), Material::default()));
        entity
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    struct Probe {
        label: &'static str,
        journal: Journal,
    }

    impl Behavior for Probe {
        fn awake(&mut self, ctx: &mut AwakeContext<'_>) -> Result<()> {
            self.journal
                .0
                .lock()
                .push(format!("{}.awake({})", self.label, ctx.entity_name()));
            Ok(())
        }
    }

    struct FakeCollider;

    impl Behavior for FakeCollider {
        fn kind(&self) -> BehaviorKind {
            BehaviorKind::Collider
        }
    }

    #[test]
    fn awake_fires_in_attach_order_before_scene_membership() {
        let journal = Journal::default();
        let mut entity = Entity::new("Player");
        entity.add_behavior(Probe {
            label: "A",
            journal: journal.clone(),
        });
        entity.add_behavior(Probe {
            label: "B",
            journal: journal.clone(),
        });
        assert_eq!(journal.entries(), vec!["A.awake(Player)", "B.awake(Player)"]);
        assert!(!entity.is_started());
    }

    #[test]
    fn second_slot_kind_replaces_the_slot_but_keeps_both() {
        let mut entity = Entity::new("Crate");
        let first = entity.add_behavior(FakeCollider);
        assert_eq!(entity.collider(), Some(first));
        let second = entity.add_behavior(FakeCollider);
        assert_eq!(entity.collider(), Some(second));
        assert_eq!(entity.behavior_count(), 2);
        assert_eq!(entity.find_behavior::<FakeCollider>(), Some(first));
    }

    #[test]
    fn camera_prefab_runs_camera_awake() {
        let entity = Entity::create_camera(Viewport::new(800, 600));
        assert_eq!(entity.camera(), Some(0));
        assert!((entity.transform().position() - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
        assert!(entity.get::<Camera>(0).is_some());
    }

    #[test]
    fn mesh_prefabs_register_a_renderer() {
        let quad = Entity::create_quad();
        assert_eq!(quad.name(), "Quad");
        assert_eq!(quad.renderer(), Some(0));
        assert_eq!(quad.find_behavior_by_name("MeshRenderer"), Some(0));
    }

    #[test]
    fn enable_flag_is_per_behavior() {
        let mut entity = Entity::new("Toggle").with_behavior(FakeCollider);
        assert!(entity.is_enabled(0));
        entity.set_enabled(0, false);
        assert!(!entity.is_enabled(0));
        assert!(!entity.is_enabled(7));
    }
}
