use glam::{Mat4, Vec2, Vec3};
use log::warn;

use super::{downcast_mut, downcast_ref, Behavior, BehaviorId};
use crate::audio::AudioBackend;
use crate::camera::Camera;
use crate::entity::{Entity, EntityId};
use crate::error::SceneError;
use crate::input::InputState;
use crate::physics::{Contact, PhysicsWorld};
use crate::render::{DrawCommand, DrawList};
use crate::scene::{SceneCommand, SceneGraph};
use crate::time::Time;
use crate::transform::Transform;
use crate::viewport::Viewport;

/// What a behavior can reach while it is being attached.
///
/// The entity has not joined a scene yet, so only its own name and
/// transform are available.
pub struct AwakeContext<'a> {
    pub(crate) entity_name: &'a str,
    pub(crate) transform: &'a mut Transform,
}

impl<'a> AwakeContext<'a> {
    pub fn entity_name(&self) -> &str {
        self.entity_name
    }

    pub fn transform(&self) -> &Transform {
        self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        self.transform
    }
}

/// Matrices of the camera currently being rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub camera: BehaviorId,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Scene access handed to every hook after Awake.
///
/// The behavior being called is detached from its entity for the duration of
/// the call, so looking it up through the context yields `None`.
pub struct FrameContext<'a> {
    pub(crate) entity: EntityId,
    pub(crate) index: usize,
    pub(crate) graph: &'a mut SceneGraph,
    pub(crate) cameras: &'a [BehaviorId],
    pub(crate) input: &'a InputState,
    pub(crate) time: &'a Time,
    pub(crate) physics: &'a mut dyn PhysicsWorld,
    pub(crate) audio: &'a mut dyn AudioBackend,
    pub(crate) draws: &'a mut DrawList,
    pub(crate) commands: &'a mut Vec<SceneCommand>,
    pub(crate) viewport: Viewport,
    pub(crate) camera_view: Option<CameraView>,
}

impl<'a> FrameContext<'a> {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn behavior_id(&self) -> BehaviorId {
        BehaviorId::new(self.entity, self.index)
    }

    pub fn entity_name(&self) -> &str {
        self.graph.get(self.entity).map(Entity::name).unwrap_or("")
    }

    pub fn transform(&self) -> &Transform {
        self.graph
            .get(self.entity)
            .map(Entity::transform)
            .unwrap_or(&Transform::IDENTITY)
    }

    /// Direct access to this entity's transform. Writes made here do not
    /// move children; use [`FrameContext::set_position`] for that.
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.graph.get_mut(self.entity).map(Entity::transform_mut)
    }

    pub fn transform_of(&self, entity: EntityId) -> Option<&Transform> {
        self.graph.get(entity).map(Entity::transform)
    }

    pub fn position(&self) -> Vec3 {
        self.transform().position()
    }

    /// Moves this entity and carries its children along.
    pub fn set_position(&mut self, position: Vec3) {
        if let Err(err) = self.graph.set_position(self.entity, position) {
            warn!("set_position: {err}");
        }
    }

    pub fn local_position(&self) -> Vec3 {
        self.graph
            .local_position(self.entity)
            .unwrap_or_else(|| self.position())
    }

    pub fn set_local_position(&mut self, local: Vec3) {
        if let Err(err) = self.graph.set_local_position(self.entity, local) {
            warn!("set_local_position: {err}");
        }
    }

    pub fn position_of(&self, entity: EntityId) -> Option<Vec3> {
        self.graph.position(entity)
    }

    pub fn set_position_of(&mut self, entity: EntityId, position: Vec3) -> Result<(), SceneError> {
        self.graph.set_position(entity, position)
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.graph.parent(self.entity)
    }

    pub fn children(&self) -> &[EntityId] {
        self.graph.children(self.entity)
    }

    pub fn behavior<T: Behavior>(&self, id: BehaviorId) -> Option<&T> {
        self.graph.behavior(id).and_then(downcast_ref::<T>)
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: BehaviorId) -> Option<&mut T> {
        self.graph.behavior_mut(id).and_then(downcast_mut::<T>)
    }

    /// First behavior of type `T` on `entity`.
    pub fn find_behavior<T: Behavior>(&self, entity: EntityId) -> Option<BehaviorId> {
        let index = self.graph.get(entity)?.find_behavior::<T>()?;
        Some(BehaviorId::new(entity, index))
    }

    /// Rigid body slot of this entity, or of the nearest ancestor that has one.
    pub fn rigid_body_in_ancestors(&self) -> Option<BehaviorId> {
        let mut current = Some(self.entity);
        while let Some(id) = current {
            let entity = self.graph.get(id)?;
            if let Some(index) = entity.rigid_body() {
                return Some(BehaviorId::new(id, index));
            }
            current = entity.parent();
        }
        None
    }

    pub fn is_enabled(&self, id: BehaviorId) -> bool {
        self.graph
            .get(id.entity)
            .map(|entity| entity.is_enabled(id.index))
            .unwrap_or(false)
    }

    pub fn set_enabled(&mut self, id: BehaviorId, enabled: bool) {
        if let Some(entity) = self.graph.get_mut(id.entity) {
            entity.set_enabled(id.index, enabled);
        }
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    pub fn time(&self) -> &Time {
        self.time
    }

    pub fn physics(&mut self) -> &mut dyn PhysicsWorld {
        &mut *self.physics
    }

    pub fn audio(&mut self) -> &mut dyn AudioBackend {
        &mut *self.audio
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// View and projection of the camera being rendered. `None` outside
    /// of the render pass.
    pub fn camera_view(&self) -> Option<&CameraView> {
        self.camera_view.as_ref()
    }

    pub fn submit(&mut self, command: DrawCommand) {
        self.draws.push(command);
    }

    /// Fans `contact` out to every behavior on `entity` once the current
    /// pass finishes.
    pub fn broadcast_collision(&mut self, entity: EntityId, contact: Contact) {
        self.commands.push(SceneCommand::Collision { entity, contact });
    }

    /// Queues `entity` for insertion at the end of the current pass.
    pub fn spawn(&mut self, entity: Entity) {
        self.commands.push(SceneCommand::Spawn {
            parent: None,
            entity: Box::new(entity),
        });
    }

    pub fn spawn_child(&mut self, parent: EntityId, entity: Entity) {
        self.commands.push(SceneCommand::Spawn {
            parent: Some(parent),
            entity: Box::new(entity),
        });
    }

    /// Queues `entity` and its children for removal.
    pub fn destroy(&mut self, entity: EntityId) {
        self.commands.push(SceneCommand::Destroy(entity));
    }

    fn main_camera(&self) -> Option<(&Camera, &Transform)> {
        self.cameras.iter().find_map(|id| {
            let camera = self.behavior::<Camera>(*id)?;
            let transform = self.transform_of(id.entity)?;
            Some((camera, transform))
        })
    }

    /// Unprojects a pixel coordinate through the first available camera.
    pub fn screen_to_world(&self, screen: Vec2, z: f32) -> Option<Vec3> {
        let (camera, transform) = self.main_camera()?;
        camera.screen_to_world(transform, screen, z)
    }

    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec3> {
        let (camera, transform) = self.main_camera()?;
        Some(camera.world_to_screen(transform, world))
    }
}
