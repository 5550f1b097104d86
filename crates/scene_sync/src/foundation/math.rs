//! Math utilities and types
//!
//! Provides the math types used by scene objects and the frame view.

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance used when deciding whether a direction is degenerate
const DIRECTION_EPSILON: f32 = 1.0e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Convert to a local transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Set rotation from Euler angles in radians, applied in XYZ order
    pub fn set_euler_xyz(&mut self, angles: Vec3) {
        self.rotation = euler_xyz(angles);
    }

    /// Orient this transform toward a point
    ///
    /// With `negative_z_forward` the -Z axis faces the target (camera and light
    /// convention); otherwise +Z does. Returns `false` and leaves the rotation
    /// untouched when the target coincides with the position.
    pub fn look_at(&mut self, target: Vec3, negative_z_forward: bool) -> bool {
        let direction = if negative_z_forward {
            self.position - target
        } else {
            target - self.position
        };

        match face_towards(direction) {
            Some(rotation) => {
                self.rotation = rotation;
                true
            }
            None => false,
        }
    }
}

/// Build a rotation from XYZ-ordered Euler angles (radians)
pub fn euler_xyz(angles: Vec3) -> Quat {
    let rx = Quat::from_axis_angle(&Vector3::x_axis(), angles.x);
    let ry = Quat::from_axis_angle(&Vector3::y_axis(), angles.y);
    let rz = Quat::from_axis_angle(&Vector3::z_axis(), angles.z);
    rx * ry * rz
}

/// Rotation whose +Z axis points along `direction`, using +Y as up
///
/// Falls back to +Z as the up reference when `direction` is parallel to +Y.
pub fn face_towards(direction: Vec3) -> Option<Quat> {
    if direction.norm() <= DIRECTION_EPSILON {
        return None;
    }

    let mut up = Vec3::y();
    if up.cross(&direction).norm() <= DIRECTION_EPSILON {
        up = Vec3::z();
    }

    Some(Quat::face_towards(&direction, &up))
}

/// Common math utilities
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * std::f32::consts::PI / 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euler_xyz_single_axis_matches_axis_angle() {
        let q = euler_xyz(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let rotated = q * Vec3::z();
        assert_relative_eq!(rotated, Vec3::x(), epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_camera_points_negative_z_at_target() {
        let mut transform = Transform {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        assert!(transform.look_at(Vec3::zeros(), true));

        let forward = transform.rotation * -Vec3::z();
        assert_relative_eq!(forward, -Vec3::z(), epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_object_points_positive_z_at_target() {
        let mut transform = Transform::default();
        assert!(transform.look_at(Vec3::new(3.0, 0.0, 0.0), false));

        let forward = transform.rotation * Vec3::z();
        assert_relative_eq!(forward, Vec3::x(), epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_straight_up_does_not_produce_nan() {
        let mut transform = Transform::default();
        assert!(transform.look_at(Vec3::new(0.0, 10.0, 0.0), false));
        let forward = transform.rotation * Vec3::z();
        assert!(forward.iter().all(|c| c.is_finite()));
        assert_relative_eq!(forward, Vec3::y(), epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_own_position_is_ignored() {
        let mut transform = Transform::default();
        assert!(!transform.look_at(Vec3::zeros(), true));
        assert_eq!(transform.rotation, Quat::identity());
    }

    #[test]
    fn test_to_matrix_translation_column() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let m = transform.to_matrix();
        assert_relative_eq!(m.m14, 1.0);
        assert_relative_eq!(m.m24, 2.0);
        assert_relative_eq!(m.m34, 3.0);
    }
}
