//! The frame loop.
//!
//! A [`Scene`] owns the entity graph, the settled input, the physics world
//! and the draw list. One call to [`Scene::frame`] runs, in order: time,
//! input advance, physics step, entity updates, deferred commands, then a
//! render pass per camera.

mod graph;

pub use graph::SceneGraph;

use glam::{Vec2, Vec3};
use log::{debug, error, info, warn};

use crate::audio::{AudioBackend, LogAudioBackend};
use crate::behavior::{
    downcast_mut, downcast_ref, Behavior, BehaviorId, BehaviorKind, CameraView, FrameContext, Hook,
};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::entity::{Entity, EntityId};
use crate::error::SceneError;
use crate::input::{InputSink, InputState};
use crate::math::MatrixExt;
use crate::physics::{basic_world_factory, Contact, PhysicsFactory, PhysicsWorld};
use crate::render::DrawList;
use crate::time::Time;
use crate::transform::Transform;
use crate::viewport::Viewport;

/// Commands behaviors queue during a pass, applied once it finishes.
#[derive(Debug)]
pub enum SceneCommand {
    Spawn {
        parent: Option<EntityId>,
        entity: Box<Entity>,
    },
    Destroy(EntityId),
    Collision {
        entity: EntityId,
        contact: Contact,
    },
}

/// Commands queued while applying commands are applied too, up to this many
/// rounds per flush.
const MAX_COMMAND_ROUNDS: usize = 16;

pub struct Scene {
    config: EngineConfig,
    graph: SceneGraph,
    cameras: Vec<BehaviorId>,
    sink: InputSink,
    input: InputState,
    time: Time,
    physics: Box<dyn PhysicsWorld>,
    physics_factory: PhysicsFactory,
    audio: Box<dyn AudioBackend>,
    draws: DrawList,
    commands: Vec<SceneCommand>,
    viewport: Viewport,
    paused: bool,
}

impl Scene {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_physics(config, basic_world_factory())
    }

    pub fn with_physics(config: EngineConfig, physics_factory: PhysicsFactory) -> Self {
        let physics = physics_factory(config.gravity);
        info!(
            "scene created: {}x{}, gravity ({:.2}, {:.2})",
            config.viewport.width, config.viewport.height, config.gravity.x, config.gravity.y
        );
        Self {
            viewport: config.viewport,
            config,
            graph: SceneGraph::new(),
            cameras: Vec::new(),
            sink: InputSink::new(),
            input: InputState::new(),
            time: Time::new(),
            physics,
            physics_factory,
            audio: Box::new(LogAudioBackend::new()),
            draws: DrawList::new(),
            commands: Vec::new(),
            paused: false,
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioBackend>) -> Self {
        self.audio = audio;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Writer for host event callbacks. Events land in the next frame.
    pub fn input_sink(&self) -> InputSink {
        self.sink.clone()
    }

    pub fn physics(&self) -> &dyn PhysicsWorld {
        self.physics.as_ref()
    }

    pub fn audio(&self) -> &dyn AudioBackend {
        self.audio.as_ref()
    }

    /// Commands from the most recent render pass.
    pub fn draws(&self) -> &DrawList {
        &self.draws
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.graph.get(id)
    }

    /// Direct access to a live entity. Attach behaviors through
    /// [`Scene::add_behavior`]; a camera attached through this reference
    /// only joins the camera list at the next render.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.graph.get_mut(id)
    }

    /// Entities in update order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.graph.iter()
    }

    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.graph.find(name)
    }

    pub fn behavior<T: Behavior>(&self, id: BehaviorId) -> Option<&T> {
        self.graph.behavior(id).and_then(downcast_ref::<T>)
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: BehaviorId) -> Option<&mut T> {
        self.graph.behavior_mut(id).and_then(downcast_mut::<T>)
    }

    /// Adds `entity` at the end of the update order and runs Start on each
    /// of its behaviors.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = self.insert_started(entity, None);
        self.flush_commands();
        id
    }

    /// Like [`Scene::add_entity`], parenting the new entity under `parent`
    /// before Start runs. The entity keeps its world position.
    pub fn add_child(&mut self, parent: EntityId, entity: Entity) -> Result<EntityId, SceneError> {
        if !self.graph.contains(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        let id = self.insert_started(entity, Some(parent));
        self.flush_commands();
        Ok(id)
    }

    /// Reparents `child`, or detaches it when `parent` is `None`.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), SceneError> {
        match parent {
            Some(parent) => self.graph.link(parent, child),
            None if self.graph.contains(child) => {
                self.graph.unlink(child);
                Ok(())
            }
            None => Err(SceneError::UnknownEntity(child)),
        }
    }

    /// Attaches a behavior to an entity that is already in the scene.
    ///
    /// Only Awake runs: an entity starts once, when it joins the scene, so
    /// behaviors attached afterwards never see Start. A camera attached
    /// this way still joins the render pass.
    pub fn add_behavior<B: Behavior>(&mut self, id: EntityId, behavior: B) -> Result<usize, SceneError> {
        let entity = self.graph.get_mut(id).ok_or(SceneError::UnknownEntity(id))?;
        let is_camera = behavior.kind() == BehaviorKind::Camera;
        let index = entity.add_behavior(behavior);
        if entity.is_started() {
            debug!("{} attached after start; it will not receive start", entity.name());
        }
        if is_camera {
            self.cameras.push(BehaviorId::new(id, index));
        }
        Ok(index)
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<(), SceneError> {
        self.graph.set_position(id, position)
    }

    /// Removes `id` and all of its descendants, calling `on_destroy` on each
    /// behavior first, parents before children.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<(), SceneError> {
        self.remove_tree(id)?;
        self.flush_commands();
        Ok(())
    }

    /// Drops every entity without running any hooks and replaces the
    /// physics world with a fresh one.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.cameras.clear();
        self.commands.clear();
        self.draws.clear();
        self.physics = (self.physics_factory)(self.config.gravity);
        debug!("scene cleared");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!("scene {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Runs one update and one render. Returns `false` without doing
    /// anything while paused.
    pub fn frame(&mut self, delta: f32) -> bool {
        if self.paused {
            return false;
        }
        self.update(delta);
        self.render();
        true
    }

    /// Advances time, input and physics, then updates every entity.
    pub fn update(&mut self, delta: f32) {
        if self.paused {
            return;
        }
        self.time.advance(delta);
        self.input.advance(&self.sink, self.time.delta_time());

        self.physics.step(
            self.config.fixed_delta,
            self.config.velocity_iterations,
            self.config.position_iterations,
        );
        self.physics.clear_forces();

        let order = self.graph.order().to_vec();
        for id in order {
            self.dispatch_entity(id, &Hook::Update, None);
        }
        self.flush_commands();
    }

    /// Rebuilds the draw list: for every camera, a clear followed by each
    /// entity's render hooks.
    pub fn render(&mut self) {
        self.register_cameras();
        self.draws.clear();
        let cameras = self.cameras.clone();
        for camera_id in cameras {
            let Some(entity) = self.graph.get(camera_id.entity) else {
                continue;
            };
            let Some(camera) = entity.get::<Camera>(camera_id.index) else {
                continue;
            };
            let Some(view) = entity.transform().model_matrix().try_inverse() else {
                warn!("camera on {} has a singular transform; skipping its pass", entity.name());
                continue;
            };
            let camera_view = CameraView {
                camera: camera_id,
                view,
                projection: camera.projection_matrix(),
            };
            self.draws.push(camera.clear());

            let order = self.graph.order().to_vec();
            for id in order {
                self.dispatch_entity(id, &Hook::Render, Some(camera_view));
            }
        }
        self.flush_commands();
    }

    /// Propagates a new surface size to every behavior.
    pub fn window_resized(&mut self, viewport: Viewport) {
        debug!("window resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        let order = self.graph.order().to_vec();
        for id in order {
            let Some(entity) = self.graph.get_mut(id) else {
                continue;
            };
            for index in 0..entity.behavior_count() {
                if let Some(behavior) = entity.behavior_mut(index) {
                    behavior.on_window_resized(viewport);
                }
            }
        }
    }

    /// Delivers `contact` to every behavior on `entity`, enabled or not.
    pub fn dispatch_collision(&mut self, entity: EntityId, contact: Contact) {
        self.dispatch_entity(entity, &Hook::Collision(contact), None);
        self.flush_commands();
    }

    /// Camera behaviors in the order they joined the scene.
    pub fn cameras(&self) -> &[BehaviorId] {
        &self.cameras
    }

    /// The first camera, with its transform.
    pub fn camera(&self) -> Option<(&Camera, &Transform)> {
        self.cameras.iter().find_map(|id| {
            let entity = self.graph.get(id.entity)?;
            Some((entity.get::<Camera>(id.index)?, entity.transform()))
        })
    }

    pub fn screen_to_world(&self, screen: Vec2, z: f32) -> Option<Vec3> {
        let (camera, transform) = self.camera()?;
        camera.screen_to_world(transform, screen, z)
    }

    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec3> {
        let (camera, transform) = self.camera()?;
        Some(camera.world_to_screen(transform, world))
    }

    fn insert_started(&mut self, entity: Entity, parent: Option<EntityId>) -> EntityId {
        let name = entity.name().to_string();
        let cameras = entity.camera_indices();
        let count = entity.behavior_count();
        let id = self.graph.insert(entity);
        if let Some(parent) = parent {
            if let Err(err) = self.graph.link(parent, id) {
                warn!("{name}: {err}");
            }
        }
        self.cameras
            .extend(cameras.into_iter().map(|index| BehaviorId::new(id, index)));
        debug!("added {name} as {id} with {count} behaviors");

        for index in 0..count {
            self.dispatch(id, index, &Hook::Start, None);
        }
        if let Some(entity) = self.graph.get_mut(id) {
            entity.started = true;
        }
        id
    }

    /// Picks up cameras that were attached without going through the scene.
    fn register_cameras(&mut self) {
        for (id, entity) in self.graph.iter() {
            for index in entity.camera_indices() {
                let camera = BehaviorId::new(id, index);
                if !self.cameras.contains(&camera) {
                    debug!("registering camera on {}", entity.name());
                    self.cameras.push(camera);
                }
            }
        }
    }

    fn remove_tree(&mut self, id: EntityId) -> Result<(), SceneError> {
        if !self.graph.contains(id) {
            return Err(SceneError::UnknownEntity(id));
        }
        let mut doomed = vec![id];
        doomed.extend(self.graph.descendants(id));

        for &entity in &doomed {
            self.dispatch_entity(entity, &Hook::Destroy, None);
        }
        for &entity in doomed.iter().rev() {
            self.graph.remove(entity);
            self.cameras.retain(|camera| camera.entity != entity);
        }
        debug!("removed {id} and {} descendants", doomed.len() - 1);
        Ok(())
    }

    fn flush_commands(&mut self) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for command in std::mem::take(&mut self.commands) {
                match command {
                    SceneCommand::Spawn { parent, entity } => {
                        if parent.is_some_and(|parent| !self.graph.contains(parent)) {
                            warn!("dropping spawn of {}: parent is gone", entity.name());
                            continue;
                        }
                        self.insert_started(*entity, parent);
                    }
                    SceneCommand::Destroy(id) => {
                        if self.remove_tree(id).is_err() {
                            debug!("{id} was already removed");
                        }
                    }
                    SceneCommand::Collision { entity, contact } => {
                        self.dispatch_entity(entity, &Hook::Collision(contact), None);
                    }
                }
            }
        }
        if !self.commands.is_empty() {
            warn!(
                "{} scene commands still pending after {MAX_COMMAND_ROUNDS} rounds; deferring",
                self.commands.len()
            );
        }
    }

    fn dispatch_entity(&mut self, id: EntityId, hook: &Hook, camera_view: Option<CameraView>) {
        let Some(count) = self.graph.get(id).map(Entity::behavior_count) else {
            return;
        };
        for index in 0..count {
            self.dispatch(id, index, hook, camera_view);
        }
    }

    /// Runs `hook` on one behavior. The behavior is taken out of its slot
    /// for the duration of the call so it can borrow the rest of the scene.
    fn dispatch(&mut self, id: EntityId, index: usize, hook: &Hook, camera_view: Option<CameraView>) {
        let Some(entity) = self.graph.get_mut(id) else {
            return;
        };
        if hook.respects_enabled() && !entity.is_enabled(index) {
            return;
        }
        let Some(mut behavior) = entity.slot_mut(index).and_then(|slot| slot.behavior.take()) else {
            return;
        };

        let Self {
            graph,
            cameras,
            input,
            time,
            physics,
            audio,
            draws,
            commands,
            viewport,
            ..
        } = self;
        let mut ctx = FrameContext {
            entity: id,
            index,
            graph,
            cameras: cameras.as_slice(),
            input,
            time,
            physics: physics.as_mut(),
            audio: audio.as_mut(),
            draws,
            commands,
            viewport: *viewport,
            camera_view,
        };
        if let Err(err) = hook.invoke(behavior.as_mut(), &mut ctx) {
            error!(
                "{}/{} failed during {}: {err:?}",
                ctx.entity_name(),
                behavior.name(),
                hook.label()
            );
        }

        if let Some(slot) = self.graph.get_mut(id).and_then(|entity| entity.slot_mut(index)) {
            slot.behavior = Some(behavior);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{bail, Result};
    use glam::Vec2;
    use parking_lot::Mutex;

    use super::*;
    use crate::behavior::AwakeContext;
    use crate::physics::{BodyHandle, BodyType, Collider, FixtureHandle, RigidBody};
    use crate::render::DrawCommand;

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn push(&self, entry: String) {
            self.0.lock().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }

        fn clear(&self) {
            self.0.lock().clear();
        }
    }

    struct Probe {
        label: &'static str,
        journal: Journal,
        fail_update: bool,
    }

    impl Probe {
        fn new(label: &'static str, journal: &Journal) -> Self {
            Self {
                label,
                journal: journal.clone(),
                fail_update: false,
            }
        }
    }

    impl Behavior for Probe {
        fn awake(&mut self, _ctx: &mut AwakeContext<'_>) -> Result<()> {
            self.journal.push(format!("{}.awake", self.label));
            Ok(())
        }

        fn start(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
            self.journal.push(format!("{}.start", self.label));
            Ok(())
        }

        fn update(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
            self.journal.push(format!("{}.update", self.label));
            if self.fail_update {
                bail!("{} exploded", self.label);
            }
            Ok(())
        }

        fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
            assert!(ctx.camera_view().is_some());
            self.journal.push(format!("{}.render", self.label));
            Ok(())
        }

        fn on_collision(&mut self, _ctx: &mut FrameContext<'_>, _contact: &Contact) -> Result<()> {
            self.journal.push(format!("{}.collision", self.label));
            Ok(())
        }

        fn on_destroy(&mut self, _ctx: &mut FrameContext<'_>) {
            self.journal.push(format!("{}.destroy", self.label));
        }
    }

    fn scene() -> Scene {
        Scene::new(EngineConfig {
            gravity: Vec2::ZERO,
            ..EngineConfig::default()
        })
    }

    fn contact() -> Contact {
        Contact {
            body_a: BodyHandle::from_raw(0),
            body_b: BodyHandle::from_raw(1),
            fixture_a: FixtureHandle::from_raw(0),
            fixture_b: FixtureHandle::from_raw(1),
            touching: true,
            normal: Vec2::X,
        }
    }

    #[test]
    fn hooks_run_in_lifecycle_order() {
        let journal = Journal::default();
        let mut scene = scene();
        scene.add_entity(Entity::create_camera(Viewport::new(640, 480)));

        let entity = Entity::new("Probe")
            .with_behavior(Probe::new("A", &journal))
            .with_behavior(Probe::new("B", &journal));
        assert_eq!(journal.entries(), vec!["A.awake", "B.awake"]);

        scene.add_entity(entity);
        assert_eq!(journal.entries()[2..], ["A.start", "B.start"]);

        journal.clear();
        assert!(scene.frame(1.0 / 60.0));
        assert_eq!(
            journal.entries(),
            vec!["A.update", "B.update", "A.render", "B.render"]
        );
    }

    #[test]
    fn disabled_behaviors_skip_update_and_render_only() {
        let journal = Journal::default();
        let mut scene = scene();
        scene.add_entity(Entity::create_camera(Viewport::default()));
        let id = scene.add_entity(Entity::new("Probe").with_behavior(Probe::new("A", &journal)));
        scene.entity_mut(id).unwrap().set_enabled(0, false);

        journal.clear();
        scene.frame(0.016);
        scene.dispatch_collision(id, contact());
        assert_eq!(journal.entries(), vec!["A.collision"]);

        scene.entity_mut(id).unwrap().set_enabled(0, true);
        journal.clear();
        scene.frame(0.016);
        assert_eq!(journal.entries(), vec!["A.update", "A.render"]);
    }

    #[test]
    fn late_behaviors_get_awake_but_never_start() {
        let journal = Journal::default();
        let mut scene = scene();
        let id = scene.add_entity(Entity::new("Late"));
        scene.add_behavior(id, Probe::new("L", &journal)).unwrap();
        scene.update(0.016);
        assert_eq!(journal.entries(), vec!["L.awake", "L.update"]);
    }

    #[test]
    fn late_cameras_join_the_render_pass() {
        let mut scene = scene();
        let id = scene.add_entity(Entity::new("Eye"));
        scene.add_behavior(id, Camera::new(Viewport::default())).unwrap();
        assert_eq!(scene.cameras().len(), 1);
        scene.render();
        assert!(matches!(scene.draws().commands(), [DrawCommand::Clear(_)]));
    }

    #[test]
    fn failing_hooks_do_not_stop_the_frame() {
        let journal = Journal::default();
        let mut scene = scene();
        let mut broken = Probe::new("A", &journal);
        broken.fail_update = true;
        scene.add_entity(Entity::new("One").with_behavior(broken));
        scene.add_entity(Entity::new("Two").with_behavior(Probe::new("B", &journal)));
        journal.clear();
        scene.update(0.016);
        assert_eq!(journal.entries(), vec!["A.update", "B.update"]);
    }

    #[test]
    fn removal_cascades_to_children_parents_first() {
        let journal = Journal::default();
        let mut scene = scene();
        let root = scene.add_entity(Entity::new("Root").with_behavior(Probe::new("root", &journal)));
        let child = scene
            .add_child(root, Entity::new("Child").with_behavior(Probe::new("child", &journal)))
            .unwrap();
        let grandchild = scene
            .add_child(child, Entity::new("Grandchild").with_behavior(Probe::new("grand", &journal)))
            .unwrap();
        let other = scene.add_entity(Entity::new("Other"));

        journal.clear();
        scene.remove_entity(root).unwrap();
        assert_eq!(
            journal.entries(),
            vec!["root.destroy", "child.destroy", "grand.destroy"]
        );
        assert!(scene.entity(grandchild).is_none());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.graph().order(), &[other]);
        assert_eq!(scene.remove_entity(root), Err(SceneError::UnknownEntity(root)));
    }

    #[test]
    fn children_follow_their_parent() {
        let mut scene = scene();
        let parent = scene.add_entity(Entity::new("Parent"));
        let child = scene
            .add_child(parent, Entity::new("Child").with_position(Vec3::new(1.0, 1.0, 0.0)))
            .unwrap();
        scene.set_position(parent, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert_eq!(scene.graph().position(child), Some(Vec3::new(6.0, 1.0, 0.0)));
        assert_eq!(scene.graph().local_position(child), Some(Vec3::new(1.0, 1.0, 0.0)));

        scene.set_parent(child, None).unwrap();
        scene.set_position(parent, Vec3::ZERO).unwrap();
        assert_eq!(scene.graph().position(child), Some(Vec3::new(6.0, 1.0, 0.0)));
        assert!(scene.set_parent(parent, Some(parent)).is_err());
    }

    struct Orbit(Vec3);

    impl Behavior for Orbit {
        fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
            ctx.set_local_position(self.0);
            Ok(())
        }
    }

    #[test]
    fn behaviors_place_themselves_relative_to_their_parent() {
        let mut scene = scene();
        let parent = scene.add_entity(Entity::new("Parent").with_position(Vec3::new(2.0, 3.0, 0.0)));
        let child = scene
            .add_child(parent, Entity::new("Moon").with_behavior(Orbit(Vec3::X)))
            .unwrap();
        scene.update(0.016);
        assert_eq!(scene.graph().position(child), Some(Vec3::new(3.0, 3.0, 0.0)));
        assert_eq!(scene.graph().local_position(child), Some(Vec3::X));
    }

    #[test]
    fn render_clears_then_draws_each_mesh_per_camera() {
        let mut scene = scene();
        scene.add_entity(Entity::create_camera(Viewport::default()));
        let quad = scene.add_entity(Entity::create_quad());
        scene.render();

        let commands = scene.draws().commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        let draw = scene.draws().meshes().next().expect("quad drawn");
        assert_eq!(draw.entity, quad);
        assert!(draw.material.matrix(crate::render::VIEW_MATRIX).is_some());
        assert!(draw.material.matrix(crate::render::PROJECTION_MATRIX).is_some());
    }

    #[test]
    fn paused_scenes_do_nothing() {
        let journal = Journal::default();
        let mut scene = scene();
        scene.add_entity(Entity::new("P").with_behavior(Probe::new("P", &journal)));
        journal.clear();
        scene.set_paused(true);
        assert!(!scene.frame(0.016));
        assert!(journal.entries().is_empty());
        assert_eq!(scene.time().frame_count(), 0);
        scene.set_paused(false);
        assert!(scene.frame(0.016));
        assert_eq!(scene.time().frame_count(), 1);
    }

    struct Spawner {
        spawned: bool,
    }

    impl Behavior for Spawner {
        fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
            if !self.spawned {
                self.spawned = true;
                ctx.spawn(Entity::new("Spawned"));
                ctx.destroy(ctx.entity());
            }
            Ok(())
        }
    }

    #[test]
    fn spawns_and_destroys_apply_after_the_pass() {
        let mut scene = scene();
        scene.add_entity(Entity::new("Spawner").with_behavior(Spawner { spawned: false }));
        scene.update(0.016);
        assert!(scene.find_entity("Spawner").is_none());
        let spawned = scene.find_entity("Spawned").expect("spawned entity");
        assert!(scene.entity(spawned).unwrap().is_started());
    }

    #[test]
    fn clear_drops_entities_without_hooks() {
        let journal = Journal::default();
        let mut scene = scene();
        scene.add_entity(Entity::create_camera(Viewport::default()));
        scene.add_entity(Entity::new("P").with_behavior(Probe::new("P", &journal)));
        journal.clear();
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.cameras().is_empty());
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn ids_from_before_a_clear_stay_dead() {
        let mut scene = scene();
        let old = scene.add_entity(Entity::new("A"));
        let old_behavior = BehaviorId::new(old, 0);
        scene.clear();

        let new = scene.add_entity(Entity::new("B").with_behavior(Camera::new(Viewport::default())));
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(scene.entity(old).is_none());
        assert!(scene.behavior::<Camera>(old_behavior).is_none());
        assert_eq!(scene.entity(new).map(Entity::name), Some("B"));
    }

    #[test]
    fn cameras_attached_directly_join_at_the_next_render() {
        let mut scene = scene();
        let id = scene.add_entity(Entity::new("Eye"));
        scene
            .entity_mut(id)
            .unwrap()
            .add_behavior(Camera::new(Viewport::default()));
        scene.render();
        assert_eq!(scene.cameras(), &[BehaviorId::new(id, 0)]);
        assert!(matches!(scene.draws().commands(), [DrawCommand::Clear(_)]));

        scene.render();
        assert_eq!(scene.cameras().len(), 1);
    }

    #[test]
    fn screen_conversions_use_the_first_camera() {
        let mut scene = scene();
        assert!(scene.screen_to_world(Vec2::ZERO, 0.5).is_none());
        scene.add_entity(Entity::create_camera(Viewport::new(800, 600)));
        let world = Vec3::new(1.0, -2.0, 3.0);
        let screen = scene.world_to_screen(world).unwrap();
        let back = scene.screen_to_world(screen.truncate(), screen.z).unwrap();
        assert!((back - world).length() < 1e-2);
    }

    #[test]
    fn resize_reaches_cameras() {
        let mut scene = scene();
        scene.add_entity(Entity::create_camera(Viewport::new(800, 600)));
        scene.window_resized(Viewport::new(400, 400));
        let (camera, _) = scene.camera().unwrap();
        assert_eq!(camera.aspect(), 1.0);
        assert_eq!(scene.viewport(), Viewport::new(400, 400));
    }

    #[test]
    fn colliders_follow_their_rigid_body() {
        let mut scene = Scene::new(EngineConfig::default());
        let body = scene.add_entity(
            Entity::new("Body")
                .with_position(Vec3::new(0.0, 5.0, 2.0))
                .with_behavior(RigidBody::new(BodyType::Dynamic)),
        );
        let shape = scene
            .add_child(body, Entity::new("Shape").with_behavior(Collider::circle(0.5)))
            .unwrap();
        let collider = scene.entity(shape).unwrap().get::<Collider>(0).unwrap();
        assert!(collider.body().is_some());
        assert!(!collider.is_inert());

        scene.update(1.0 / 60.0);
        let position = scene.graph().position(shape).unwrap();
        assert!(position.y < 5.0);
        assert_eq!(position.z, 0.0);
    }

    #[test]
    fn removing_an_entity_destroys_its_body() {
        let mut scene = scene();
        let a = scene.add_entity(
            Entity::new("A")
                .with_behavior(RigidBody::new(BodyType::Static))
                .with_behavior(Collider::circle(1.0)),
        );
        scene.add_entity(
            Entity::new("B")
                .with_position(Vec3::new(1.0, 0.0, 0.0))
                .with_behavior(RigidBody::new(BodyType::Static))
                .with_behavior(Collider::circle(1.0)),
        );
        let body = scene
            .entity(a)
            .and_then(|entity| entity.get::<RigidBody>(0))
            .and_then(RigidBody::handle)
            .expect("body created at start");
        scene.update(0.016);
        assert!(!scene.physics().contacts(body).is_empty());

        scene.remove_entity(a).unwrap();
        scene.update(0.016);
        assert_eq!(scene.physics().body_position(body), None);
        assert!(scene.physics().contacts(body).is_empty());
    }

    #[test]
    fn colliders_without_a_body_go_inert() {
        let mut scene = scene();
        let id = scene.add_entity(Entity::new("Loose").with_behavior(Collider::boxed()));
        let collider = scene.entity(id).unwrap().get::<Collider>(0).unwrap();
        assert!(collider.is_inert());
        scene.update(0.016);
        assert_eq!(scene.graph().position(id), Some(Vec3::ZERO));
    }

    #[test]
    fn touching_colliders_broadcast_collisions() {
        let journal = Journal::default();
        let mut scene = scene();
        scene.add_entity(
            Entity::new("A")
                .with_behavior(RigidBody::new(BodyType::Static))
                .with_behavior(Collider::circle(1.0))
                .with_behavior(Probe::new("A", &journal)),
        );
        scene.add_entity(
            Entity::new("B")
                .with_position(Vec3::new(1.0, 0.0, 0.0))
                .with_behavior(RigidBody::new(BodyType::Static))
                .with_behavior(Collider::circle(1.0)),
        );
        journal.clear();
        scene.update(0.016);
        assert_eq!(journal.entries(), vec!["A.update", "A.collision"]);
    }
}
