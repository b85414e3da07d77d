use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use log::warn;

/// Reference direction of an unrotated transform, forward is -Z in a
/// right-handed system.
const FORWARD: Vec3 = Vec3::NEG_Z;

/// Below this length the look direction is treated as parallel to [`FORWARD`].
const PARALLEL_EPSILON: f32 = 1e-3;

/// Shear matrix applied innermost, before scale.
pub fn shear_matrix(shear: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(1.0, shear.y, shear.z, 0.0),
        Vec4::new(shear.x, 1.0, shear.z, 0.0),
        Vec4::Z,
        Vec4::W,
    )
}

/// Position, orientation, scale and shear of an object.
///
/// The composed matrix is `translation * rotation * scale * shear` and is
/// rebuilt on every mutation, so [`Transform::matrix`] always reflects the
/// last written fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    orientation: Quat,
    scale: Vec3,
    shear: Vec3,
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

impl Transform {
    pub fn new(position: Vec3, orientation: Quat, scale: Vec3) -> Self {
        Self::with_shear(position, orientation, scale, Vec3::ZERO)
    }

    pub fn with_shear(position: Vec3, orientation: Quat, scale: Vec3, shear: Vec3) -> Self {
        let mut transform = Self {
            position,
            orientation,
            scale,
            shear,
            matrix: Mat4::IDENTITY,
        };
        transform.update_matrix();
        transform
    }

    pub fn from_uniform_scale(position: Vec3, orientation: Quat, scale: f32) -> Self {
        Self::new(position, orientation, Vec3::splat(scale))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn shear(&self) -> Vec3 {
        self.shear
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrix();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        self.update_matrix();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.update_matrix();
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vec3::splat(scale));
    }

    pub fn set_shear(&mut self, shear: Vec3) {
        self.shear = shear;
        self.update_matrix();
    }

    pub fn move_by(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Move along the local axes instead of the world axes.
    pub fn move_relative(&mut self, forward: f32, right: f32, up: f32) {
        let rotation = Mat3::from_quat(self.orientation);
        let right_axis = rotation.x_axis;
        let up_axis = rotation.y_axis;
        let forward_axis = -rotation.z_axis;
        self.move_by(forward_axis * forward + right_axis * right + up_axis * up);
    }

    /// Place the transform at `from` and turn local -Z towards `at`.
    ///
    /// Coincident points leave the orientation untouched.
    pub fn look(&mut self, from: Vec3, at: Vec3) {
        self.position = from;
        let direction = at - from;
        if direction.length_squared() <= f32::EPSILON {
            warn!("Looking at own position {:?}, orientation unchanged", from);
            self.update_matrix();
            return;
        }
        let direction = direction.normalize();
        let dot = FORWARD.dot(direction).clamp(-1.0, 1.0);
        let angle = dot.acos();
        let mut axis = FORWARD.cross(direction);
        if axis.length() < PARALLEL_EPSILON {
            // opposite directions need a half turn around an axis perpendicular to forward
            axis = if dot > 0.0 { FORWARD } else { Vec3::Y };
        }
        self.orientation = Quat::from_axis_angle(axis.normalize(), angle);
        self.update_matrix();
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.look(self.position, target);
    }

    /// Rotate around the local axes. Repeated calls accumulate roll.
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        let xq = Quat::from_axis_angle(Vec3::X, dx);
        let yq = Quat::from_axis_angle(Vec3::Y, dy);
        let zq = Quat::from_axis_angle(Vec3::Z, dz);
        self.set_orientation(self.orientation * xq * yq * zq);
    }

    /// Pitch around the local X axis and yaw around the world Y axis, which
    /// keeps the horizon level.
    pub fn rotate_without_roll(&mut self, dx: f32, dy: f32) {
        let xq = Quat::from_axis_angle(Vec3::X, dx);
        let yq = Quat::from_axis_angle(Vec3::Y, dy);
        self.set_orientation(yq * self.orientation * xq);
    }

    fn update_matrix(&mut self) {
        self.matrix = Mat4::from_translation(self.position)
            * Mat4::from_quat(self.orientation)
            * Mat4::from_scale(self.scale)
            * shear_matrix(self.shear);
    }
}

#[cfg(test)]
mod test {
    use std::f32::consts::FRAC_PI_2;

    use glam::{Mat4, Quat, Vec3};

    use super::{shear_matrix, Transform};

    #[test]
    fn test_composition_order() {
        let transform = Transform::with_shear(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::splat(2.0),
            Vec3::new(0.5, 0.0, 0.0),
        );
        // shear moves (0, 1, 0) to (0.5, 1, 0) first, then scale, rotate and translate
        let point = transform.matrix().transform_point3(Vec3::Y);
        assert!(point.abs_diff_eq(Vec3::new(-1.0, 3.0, 3.0), 1e-5));

        let expected = Mat4::from_translation(transform.position())
            * Mat4::from_quat(transform.orientation())
            * Mat4::from_scale(transform.scale())
            * shear_matrix(transform.shear());
        assert!(transform.matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_setters_rebuild_matrix() {
        let mut transform = Transform::default();
        assert_eq!(*transform.matrix(), Mat4::IDENTITY);
        transform.move_by(Vec3::X);
        transform.move_by(Vec3::X);
        assert!(transform
            .matrix()
            .abs_diff_eq(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)), 1e-6));
        transform.set_uniform_scale(3.0);
        assert!(transform
            .matrix()
            .transform_vector3(Vec3::Z)
            .abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-6));
    }

    #[test]
    fn test_move_relative() {
        let mut transform = Transform::default();
        // forward is -Z without rotation
        transform.move_relative(1.0, 0.0, 0.0);
        assert!(transform.position().abs_diff_eq(Vec3::NEG_Z, 1e-6));

        let mut transform = Transform::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2), Vec3::ONE);
        // turned left, forward now points to -X and right to -Z
        transform.move_relative(1.0, 2.0, 3.0);
        assert!(transform
            .position()
            .abs_diff_eq(Vec3::new(-1.0, 3.0, -2.0), 1e-5));
    }

    #[test]
    fn test_look_at() {
        let mut transform = Transform::default();
        transform.look(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        let forward = transform.orientation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::X, 1e-5));

        transform.look(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 4.0));
        let forward = transform.orientation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::Z, 1e-5));

        transform.look_at(Vec3::new(0.0, 1.0, -4.0));
        let forward = transform.orientation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_look_at_own_position() {
        let orientation = Quat::from_rotation_x(0.3);
        let mut transform = Transform::new(Vec3::ONE, orientation, Vec3::ONE);
        transform.look_at(Vec3::ONE);
        assert_eq!(transform.orientation(), orientation);
        assert!(!transform.matrix().is_nan());
    }

    #[test]
    fn test_rotate_without_roll() {
        let mut transform = Transform::default();
        for _ in 0..8 {
            transform.rotate_without_roll(0.1, 0.2);
        }
        // local X stays horizontal
        let right = transform.orientation() * Vec3::X;
        assert!(right.y.abs() < 1e-5);

        let mut transform = Transform::default();
        transform.rotate(0.0, FRAC_PI_2, 0.0);
        let forward = transform.orientation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }
}
