use glam::{Mat4, Quat, Vec3, Vec4};

use crate::math::{quat_from_yaw_pitch_roll, MatrixExt};

/// Position, rotation and scale of an entity.
///
/// The model matrix holds rotation and translation only. Scale is kept in a
/// separate matrix and multiplied in on demand by
/// [`Transform::scaled_model_matrix`], so position and rotation reads never
/// see it.
///
/// Reading and writing `position` here touches only this transform. Moving an
/// entity together with its children goes through the scene graph
/// (`SceneGraph::set_position`), which owns the parent/child links.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    model_matrix: Mat4,
    scale: Vec3,
    scale_matrix: Mat4,
    rotation: Quat,
    euler_angles: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        model_matrix: Mat4::IDENTITY,
        scale: Vec3::ONE,
        scale_matrix: Mat4::IDENTITY,
        rotation: Quat::IDENTITY,
        euler_angles: Vec3::ZERO,
    };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn set_model_matrix(&mut self, matrix: Mat4) {
        self.model_matrix = matrix;
    }

    /// Model matrix with the scale applied in local space.
    pub fn scaled_model_matrix(&self) -> Mat4 {
        self.model_matrix * self.scale_matrix
    }

    /// World position, read from the translation column.
    pub fn position(&self) -> Vec3 {
        self.model_matrix.w_axis.truncate()
    }

    /// Overwrites the translation column without touching children.
    pub fn set_translation(&mut self, position: Vec3) {
        self.model_matrix.w_axis = position.extend(1.0);
    }

    pub fn right(&self) -> Vec3 {
        self.model_matrix.x_axis.truncate()
    }

    /// Writes the first basis column. The other two are left as they are.
    pub fn set_right(&mut self, right: Vec3) {
        self.model_matrix.x_axis = right.extend(0.0);
    }

    pub fn up(&self) -> Vec3 {
        self.model_matrix.y_axis.truncate()
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.model_matrix.y_axis = up.extend(0.0);
    }

    pub fn forward(&self) -> Vec3 {
        self.model_matrix.z_axis.truncate()
    }

    pub fn set_forward(&mut self, forward: Vec3) {
        self.model_matrix.z_axis = forward.extend(0.0);
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// The yaw/pitch/roll last written with [`Transform::set_euler_angles`].
    pub fn euler_angles(&self) -> Vec3 {
        self.euler_angles
    }

    /// Rebuilds the model matrix from the current translation and the given
    /// yaw (x), pitch (y) and roll (z), in radians. Any basis skew written
    /// through `set_right`/`set_up`/`set_forward` is discarded.
    pub fn set_euler_angles(&mut self, angles: Vec3) {
        self.euler_angles = angles;
        self.rotation = quat_from_yaw_pitch_roll(angles);
        self.model_matrix = Mat4::from_rotation_translation(self.rotation, self.position());
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.scale_matrix = Mat4::from_scale(scale);
    }

    pub fn scale_matrix(&self) -> Mat4 {
        self.scale_matrix
    }

    /// Rotates in place about `axis` (model space). Returns `false` for a
    /// degenerate axis.
    pub fn rotate(&mut self, axis: Vec3, radians: f32) -> bool {
        self.model_matrix.rotate_axis_angle(axis, radians)
    }

    /// Rotates about this transform's own right axis.
    pub fn rotate_local_x(&mut self, radians: f32) -> bool {
        self.rotate(Vec3::X, radians)
    }

    /// Rotates about this transform's own up axis.
    pub fn rotate_local_y(&mut self, radians: f32) -> bool {
        self.rotate(Vec3::Y, radians)
    }

    /// Replaces the model matrix with a view basis looking from the current
    /// position toward `target`.
    pub fn look_at(&mut self, target: Vec3, world_up: Vec3) {
        self.model_matrix = Mat4::look_at(self.position(), target, world_up);
    }

    /// Transforms a point from local to world space, scale included.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        (self.scaled_model_matrix() * Vec4::from((point, 1.0))).truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn position_round_trips_exactly() {
        let mut t = Transform::new();
        for v in [
            Vec3::new(1.5, -2.25, 3.0),
            Vec3::new(1e6, -1e-6, 0.1),
            Vec3::ZERO,
        ] {
            t.set_translation(v);
            assert_eq!(t.position(), v);
        }
    }

    #[test]
    fn scale_never_leaks_into_position_or_rotation() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(1.0, 2.0, 3.0));
        t.set_euler_angles(Vec3::new(0.1, 0.2, 0.3));
        let position = t.position();
        let angles = t.euler_angles();
        let model = t.model_matrix();

        t.set_scale(Vec3::new(2.0, 3.0, 4.0));

        assert_eq!(t.position(), position);
        assert_eq!(t.euler_angles(), angles);
        assert_eq!(t.model_matrix(), model);
        assert_eq!(t.scaled_model_matrix(), t.model_matrix() * t.scale_matrix());
    }

    #[test]
    fn euler_angles_keep_translation_and_discard_skew() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(4.0, 5.0, 6.0));
        t.set_right(Vec3::new(3.0, 0.0, 0.0));
        t.set_euler_angles(Vec3::ZERO);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.position(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn basis_setters_do_not_orthonormalize() {
        let mut t = Transform::new();
        t.set_up(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(t.up(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.forward(), Vec3::Z);
    }

    #[test]
    fn local_rotation_is_intrinsic() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(1.0, 0.0, 0.0));
        assert!(t.rotate_local_y(FRAC_PI_2));
        assert!((t.forward() - Vec3::X).length() < 1e-5);
        assert!(t.rotate_local_x(FRAC_PI_2));
        assert_eq!(t.position(), Vec3::new(1.0, 0.0, 0.0));
        assert!(!t.rotate(Vec3::ZERO, 1.0));
    }

    #[test]
    fn look_at_from_behind_origin() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(0.0, 0.0, -10.0));
        t.look_at(Vec3::ZERO, Vec3::Y);
        assert!((t.position() - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
        assert!((t.right() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn scaled_points() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(1.0, 2.0, 1.0));
        t.set_translation(Vec3::new(3.5, 0.0, 0.0));
        assert_eq!(t.transform_point(Vec3::new(0.5, 0.5, 0.0)), Vec3::new(4.0, 1.0, 0.0));
    }
}
