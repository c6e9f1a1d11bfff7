use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};

use crate::behavior::{AwakeContext, Behavior, BehaviorKind};
use crate::math::{unproject, Color, MatrixExt};
use crate::render::DrawCommand;
use crate::transform::Transform;
use crate::viewport::Viewport;

/// Where a freshly attached camera puts its entity.
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, -10.0);

/// Perspective camera. Its pose is the owning entity's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view, in degrees.
    field_of_view: f32,
    near_clip_plane: f32,
    far_clip_plane: f32,
    aspect: f32,
    projection: Mat4,
    viewport: Viewport,
    pub background: Color,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        let mut camera = Self {
            field_of_view: 45.0,
            near_clip_plane: 0.1,
            far_clip_plane: 1000.0,
            aspect: viewport.aspect(),
            projection: Mat4::IDENTITY,
            viewport,
            background: Color::UNITY_BLUE,
        };
        camera.rebuild_projection();
        camera
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    pub fn set_field_of_view(&mut self, degrees: f32) {
        self.field_of_view = degrees;
        self.rebuild_projection();
    }

    pub fn near_clip_plane(&self) -> f32 {
        self.near_clip_plane
    }

    pub fn far_clip_plane(&self) -> f32 {
        self.far_clip_plane
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near_clip_plane = near;
        self.far_clip_plane = far;
        self.rebuild_projection();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Overrides the aspect ratio until the next resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.rebuild_projection();
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn rebuild_projection(&mut self) {
        self.projection = Mat4::perspective(
            self.field_of_view.to_radians(),
            self.aspect,
            self.near_clip_plane,
            self.far_clip_plane,
        );
    }

    /// `projection × model`, the matrix both screen conversions go through.
    pub fn combined_matrix(&self, transform: &Transform) -> Mat4 {
        self.projection * transform.model_matrix()
    }

    /// Converts a pixel coordinate (y down) and a depth in `[0, 1]` to a
    /// world point. `None` when the point is off screen or the camera matrix
    /// is singular.
    pub fn screen_to_world(&self, transform: &Transform, screen: Vec2, z: f32) -> Option<Vec3> {
        let mut world = unproject(
            self.combined_matrix(transform),
            0.0,
            self.viewport.width as f32,
            0.0,
            self.viewport.height as f32,
            screen.x,
            screen.y,
            z,
        )?;
        world.y = -world.y;
        Some(world)
    }

    /// Converts a world point to pixel coordinates (y down). The returned z
    /// is the depth in `[0, 1]`, ready to be fed back to
    /// [`Camera::screen_to_world`].
    pub fn world_to_screen(&self, transform: &Transform, world: Vec3) -> Vec3 {
        let ndc = self.combined_matrix(transform).apply_projection(world);
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.width as f32,
            (-ndc.y + 1.0) * 0.5 * self.viewport.height as f32,
            (ndc.z + 1.0) * 0.5,
        )
    }

    /// Command clearing the color and depth buffers to the background.
    pub fn clear(&self) -> DrawCommand {
        DrawCommand::Clear(self.background)
    }
}

impl Behavior for Camera {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Camera
    }

    fn awake(&mut self, ctx: &mut AwakeContext<'_>) -> Result<()> {
        let transform = ctx.transform_mut();
        transform.set_translation(DEFAULT_CAMERA_POSITION);
        transform.look_at(Vec3::ZERO, Vec3::Y);
        Ok(())
    }

    fn on_window_resized(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.aspect = viewport.aspect();
        self.rebuild_projection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    fn default_pose() -> (Camera, Transform) {
        let entity = Entity::create_camera(Viewport::new(800, 600));
        let camera = entity.get::<Camera>(0).cloned().expect("camera attached");
        (camera, entity.transform().clone())
    }

    #[test]
    fn aspect_follows_viewport() {
        let mut camera = Camera::new(Viewport::new(800, 400));
        assert_eq!(camera.aspect(), 2.0);
        camera.on_window_resized(Viewport::new(300, 300));
        assert_eq!(camera.aspect(), 1.0);
        assert_eq!(
            camera.projection_matrix(),
            Mat4::perspective(45f32.to_radians(), 1.0, 0.1, 1000.0)
        );
    }

    #[test]
    fn screen_round_trip_reconstructs_world_points() {
        let (camera, transform) = default_pose();
        for world in [
            Vec3::ZERO,
            Vec3::new(1.0, 0.5, 0.0),
            Vec3::new(-2.0, -1.5, 3.0),
            Vec3::new(0.25, 2.0, -4.0),
        ] {
            let screen = camera.world_to_screen(&transform, world);
            let back = camera
                .screen_to_world(&transform, screen.truncate(), screen.z)
                .expect("point inside frustum");
            assert!(
                (back - world).abs().max_element() < 1e-3,
                "{world:?} came back as {back:?}"
            );
        }
    }

    #[test]
    fn origin_lands_in_the_middle_of_the_screen() {
        let (camera, transform) = default_pose();
        let screen = camera.world_to_screen(&transform, Vec3::ZERO);
        assert!((screen.x - 400.0).abs() < 1e-3);
        assert!((screen.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn off_screen_points_do_not_unproject() {
        let (camera, transform) = default_pose();
        assert!(camera
            .screen_to_world(&transform, Vec2::new(900.0, 10.0), 0.5)
            .is_none());
        assert!(camera
            .screen_to_world(&transform, Vec2::new(10.0, 10.0), 1.5)
            .is_none());
    }

    #[test]
    fn clear_uses_background() {
        let camera = Camera::new(Viewport::default()).with_background(Color::CORNFLOWER_BLUE);
        assert_eq!(camera.clear(), DrawCommand::Clear(Color::CORNFLOWER_BLUE));
    }
}
