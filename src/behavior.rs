//! Attachable units of entity logic.

mod context;

pub use context::{AwakeContext, CameraView, FrameContext};

use std::any::Any;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::physics::Contact;
use crate::viewport::Viewport;

/// Well-known roles an entity keeps a direct slot for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Script,
    Camera,
    Renderer,
    RigidBody,
    Collider,
}

/// Handle to a behavior attached to an entity that lives in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BehaviorId {
    pub entity: EntityId,
    pub index: usize,
}

impl BehaviorId {
    pub const fn new(entity: EntityId, index: usize) -> Self {
        Self { entity, index }
    }
}

/// Upcast helper so behaviors can be looked up by concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Logic attached to an entity.
///
/// Hooks fire in attach order:
///
/// * `awake` once, as soon as the behavior is attached, before the entity
///   joins a scene;
/// * `start` once, when the owning entity is added to a scene (behaviors
///   attached after that point never receive it);
/// * `update` and `render` every frame while the behavior is enabled.
///
/// A hook that returns an error is logged and the frame carries on with the
/// next behavior.
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    /// Short, human-readable name used in diagnostics.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Script
    }

    fn awake(&mut self, ctx: &mut AwakeContext<'_>) -> Result<()> {
        Ok(())
    }

    fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_collision(&mut self, ctx: &mut FrameContext<'_>, contact: &Contact) -> Result<()> {
        Ok(())
    }

    fn on_window_resized(&mut self, viewport: Viewport) {}

    fn on_destroy(&mut self, ctx: &mut FrameContext<'_>) {}
}

pub fn downcast_ref<'a, T: Behavior>(behavior: &'a (dyn Behavior + 'static)) -> Option<&'a T> {
    behavior.as_any().downcast_ref::<T>()
}

pub fn downcast_mut<'a, T: Behavior>(
    behavior: &'a mut (dyn Behavior + 'static),
) -> Option<&'a mut T> {
    behavior.as_any_mut().downcast_mut::<T>()
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Lifecycle points the scene dispatches through a [`FrameContext`].
#[derive(Debug, Clone)]
pub(crate) enum Hook {
    Start,
    Update,
    Render,
    Collision(Contact),
    Destroy,
}

impl Hook {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Hook::Start => "start",
            Hook::Update => "update",
            Hook::Render => "render",
            Hook::Collision(_) => "on_collision",
            Hook::Destroy => "on_destroy",
        }
    }

    /// Update and render skip disabled behaviors; the rest always run.
    pub(crate) fn respects_enabled(&self) -> bool {
        matches!(self, Hook::Update | Hook::Render)
    }

    pub(crate) fn invoke(
        &self,
        behavior: &mut dyn Behavior,
        ctx: &mut FrameContext<'_>,
    ) -> Result<()> {
        match self {
            Hook::Start => behavior.start(ctx),
            Hook::Update => behavior.update(ctx),
            Hook::Render => behavior.render(ctx),
            Hook::Collision(contact) => behavior.on_collision(ctx, contact),
            Hook::Destroy => {
                behavior.on_destroy(ctx);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spinner;

    impl Behavior for Spinner {}

    #[test]
    fn default_name_is_the_bare_type_name() {
        assert_eq!(Spinner.name(), "Spinner");
        assert_eq!(short_type_name("a::b::Thing<c::D>"), "Thing");
    }

    #[test]
    fn downcasts_through_trait_objects() {
        let mut boxed: Box<dyn Behavior> = Box::new(Spinner);
        assert!(downcast_ref::<Spinner>(boxed.as_ref()).is_some());
        assert!(downcast_mut::<Spinner>(boxed.as_mut()).is_some());
        assert_eq!(boxed.kind(), BehaviorKind::Script);
    }
}
