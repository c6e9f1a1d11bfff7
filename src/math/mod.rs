//! Matrix and vector helpers layered on top of `glam`.
//!
//! `glam` already stores matrices column-major with the translation in the
//! last column, which is the layout the engine's transform code relies on.
//! The helpers here add the handful of operations the engine needs that
//! `glam` does not provide directly (GL-style frustum construction,
//! unprojection with explicit failure, axis-angle rotation that rejects
//! degenerate axes).

mod bounds;
mod color;

pub use bounds::{BoundingBox2D, BoundingBox3D};
pub use color::Color;

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

/// Axis lengths below this are treated as degenerate by [`MatrixExt::rotate_axis_angle`].
pub const AXIS_EPSILON: f32 = 1e-6;

/// Engine-specific operations on [`Mat4`].
pub trait MatrixExt: Sized {
    /// OpenGL-style perspective frustum.
    fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self;

    /// Symmetric perspective projection. `fov_y` is in radians.
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self;

    /// Returns the inverse, or `None` when the determinant is zero.
    fn try_inverse(&self) -> Option<Self>;

    /// Transforms `point` as a homogeneous coordinate and divides by `w`.
    fn apply_projection(&self, point: Vec3) -> Vec3;

    /// Post-multiplies an axis-angle rotation in place.
    ///
    /// Returns `false` (and leaves the matrix untouched) when the axis is
    /// too short to normalize.
    fn rotate_axis_angle(&mut self, axis: Vec3, radians: f32) -> bool;

    /// Right-handed view basis looking from `eye` toward `center`.
    ///
    /// Returns identity when `eye` and `center` coincide.
    fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self;
}

impl MatrixExt for Mat4 {
    fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let two_near = 2.0 * near;
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;
        Mat4::from_cols(
            Vec4::new(two_near / width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, two_near / height, 0.0, 0.0),
            Vec4::new(
                (right + left) / width,
                (top + bottom) / height,
                -(far + near) / depth,
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -(two_near * far) / depth, 0.0),
        )
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let height = (fov_y * 0.5).tan() * near;
        let width = height * aspect;
        Self::frustum(-width, width, -height, height, near, far)
    }

    fn try_inverse(&self) -> Option<Self> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return None;
        }
        Some(self.inverse())
    }

    fn apply_projection(&self, point: Vec3) -> Vec3 {
        let v = *self * point.extend(1.0);
        if v.w == 0.0 {
            return v.truncate();
        }
        v.truncate() / v.w
    }

    fn rotate_axis_angle(&mut self, axis: Vec3, radians: f32) -> bool {
        let length = axis.length();
        if length < AXIS_EPSILON {
            return false;
        }
        *self = *self * Mat4::from_axis_angle(axis / length, radians);
        true
    }

    fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        if (eye - center).abs().max_element() < AXIS_EPSILON {
            return Mat4::IDENTITY;
        }
        Mat4::look_at_rh(eye, center, up)
    }
}

/// Maps a window-space point back into world space through `matrix`.
///
/// `x`/`y` are pixel coordinates inside the viewport rectangle and `z` is the
/// depth in `[0, 1]`. Returns `None` when the normalized point leaves the
/// unit cube, when `matrix` is singular, or when the homogeneous `w` is zero.
#[allow(clippy::too_many_arguments)]
pub fn unproject(
    matrix: Mat4,
    viewport_x: f32,
    viewport_width: f32,
    viewport_y: f32,
    viewport_height: f32,
    x: f32,
    y: f32,
    z: f32,
) -> Option<Vec3> {
    let ndc = Vec3::new(
        2.0 * (x - viewport_x) / viewport_width - 1.0,
        2.0 * (y - viewport_y) / viewport_height - 1.0,
        2.0 * z - 1.0,
    );
    if !(-1.0..=1.0).contains(&ndc.x)
        || !(-1.0..=1.0).contains(&ndc.y)
        || !(-1.0..=1.0).contains(&ndc.z)
    {
        return None;
    }

    let inverse = matrix.try_inverse()?;
    let world = inverse * ndc.extend(1.0);
    if world.w == 0.0 {
        return None;
    }
    Some(world.truncate() / world.w)
}

/// Rotation from yaw (about Y), pitch (about X) and roll (about Z), in radians.
pub fn quat_from_yaw_pitch_roll(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, angles.x, angles.y, angles.z)
}

/// Inverse of [`quat_from_yaw_pitch_roll`].
pub fn yaw_pitch_roll_from_quat(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(yaw, pitch, roll)
}
