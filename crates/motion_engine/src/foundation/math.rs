//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene and the planner.
//! Everything is double precision; poses follow the 7-element pose-vector
//! convention `[x, y, z, qw, qx, qy, qz]`.

pub use nalgebra::{
    Vector3,
    Quaternion,
    UnitQuaternion,
    Isometry3,
    Translation3,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Unit quaternion type for rotations
pub type Quat = UnitQuaternion<f64>;

/// Flat pose representation: position followed by a w-first quaternion
pub type PoseVec = [f64; 7];

/// RGB color triple, each channel in `[0, 1]`
pub type Color = [f32; 3];

/// Errors produced when building a pose from raw numbers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    /// The orientation part has (near) zero norm and cannot be normalized
    #[error("Degenerate quaternion [{0}, {1}, {2}, {3}]")]
    DegenerateQuaternion(f64, f64, f64, f64),

    /// A component is NaN or infinite
    #[error("Non-finite pose component at index {0}")]
    NonFinite(usize),
}

/// Rigid pose: position plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoseVec", into = "PoseVec")]
pub struct Pose {
    /// Position in world space (meters)
    pub position: Vec3,

    /// Orientation
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Identity pose at the origin
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    /// Create a pose from position and rotation
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a pose with only a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
        }
    }

    /// Parse a `[x, y, z, qw, qx, qy, qz]` vector, normalizing the quaternion
    pub fn from_pose_vec(pose: &PoseVec) -> Result<Self, PoseError> {
        if let Some(index) = pose.iter().position(|v| !v.is_finite()) {
            return Err(PoseError::NonFinite(index));
        }

        let quaternion = Quaternion::new(pose[3], pose[4], pose[5], pose[6]);
        if quaternion.norm() < 1e-9 {
            return Err(PoseError::DegenerateQuaternion(pose[3], pose[4], pose[5], pose[6]));
        }

        Ok(Self {
            position: Vec3::new(pose[0], pose[1], pose[2]),
            rotation: Quat::from_quaternion(quaternion),
        })
    }

    /// Flatten to `[x, y, z, qw, qx, qy, qz]`
    pub fn to_pose_vec(&self) -> PoseVec {
        let q = self.rotation.quaternion();
        [
            self.position.x,
            self.position.y,
            self.position.z,
            q.w,
            q.i,
            q.j,
            q.k,
        ]
    }

    /// Convert to an isometry
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Build from an isometry
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self {
            position: iso.translation.vector,
            rotation: iso.rotation,
        }
    }

    /// Map a point expressed in this pose's local frame into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Copy of this pose shifted by a world-space offset, rotation unchanged
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            position: self.position + offset,
            rotation: self.rotation,
        }
    }

    /// Interpolate towards `other`: linear in position, spherical in rotation
    pub fn interpolate(&self, other: &Pose, t: f64) -> Self {
        let t = utils::clamp(t, 0.0, 1.0);
        let rotation = self
            .rotation
            .try_slerp(&other.rotation, t, 1e-9)
            .unwrap_or(other.rotation);

        Self {
            position: self.position.lerp(&other.position, t),
            rotation,
        }
    }

    /// Angle between the two orientations in radians
    pub fn angular_distance(&self, other: &Pose) -> f64 {
        self.rotation.angle_to(&other.rotation)
    }

    /// Euclidean distance between the two positions
    pub fn linear_distance(&self, other: &Pose) -> f64 {
        (self.position - other.position).magnitude()
    }
}

impl TryFrom<PoseVec> for Pose {
    type Error = PoseError;

    fn try_from(value: PoseVec) -> Result<Self, Self::Error> {
        Self::from_pose_vec(&value)
    }
}

impl From<Pose> for PoseVec {
    fn from(pose: Pose) -> Self {
        pose.to_pose_vec()
    }
}

/// Math utility functions
pub mod utils {
    /// Clamp a value between min and max
    pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Move `current` towards `target` by at most `max_delta`
    pub fn approach(current: f64, target: f64, max_delta: f64) -> f64 {
        let delta = target - current;
        if delta.abs() <= max_delta {
            target
        } else {
            current + max_delta.copysign(delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_pose_vec_is_w_first() {
        let pose = Pose::from_pose_vec(&[0.4, 0.3, 0.12, 0.0, 1.0, 0.0, 0.0]).unwrap();

        assert_relative_eq!(pose.position, Vec3::new(0.4, 0.3, 0.12), epsilon = EPSILON);
        let q = pose.rotation.quaternion();
        assert_relative_eq!(q.w, 0.0, epsilon = EPSILON);
        assert_relative_eq!(q.i, 1.0, epsilon = EPSILON);

        let back = pose.to_pose_vec();
        for (a, b) in back.iter().zip([0.4, 0.3, 0.12, 0.0, 1.0, 0.0, 0.0]) {
            assert_relative_eq!(*a, b, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_pose_vec_normalizes_quaternion() {
        let pose = Pose::from_pose_vec(&[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(pose.rotation.quaternion().w, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_degenerate_quaternion_rejected() {
        let result = Pose::from_pose_vec(&[0.0; 7]);
        assert!(matches!(result, Err(PoseError::DegenerateQuaternion(..))));

        let result = Pose::from_pose_vec(&[0.0, f64::NAN, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(result, Err(PoseError::NonFinite(1)));
    }

    #[test]
    fn test_gripper_down_points_local_z_to_world_minus_z() {
        // [0, 1, 0, 0] is a half turn about x
        let pose = Pose::from_pose_vec(&[0.4, 0.3, 0.2, 0.0, 1.0, 0.0, 0.0]).unwrap();
        let tip = pose.transform_point(Vec3::new(0.0, 0.0, 0.1));

        assert_relative_eq!(tip, Vec3::new(0.4, 0.3, 0.1), epsilon = EPSILON);
    }

    #[test]
    fn test_interpolate_endpoints_and_midpoint() {
        let a = Pose::from_position(Vec3::new(0.0, 0.0, 0.0));
        let b = Pose::from_position(Vec3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(a.interpolate(&b, 0.0).position, a.position, epsilon = EPSILON);
        assert_relative_eq!(a.interpolate(&b, 1.0).position, b.position, epsilon = EPSILON);
        assert_relative_eq!(
            a.interpolate(&b, 0.5).position,
            Vec3::new(0.5, 1.0, 1.5),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_interpolate_rotation() {
        let a = Pose::identity();
        let b = Pose::new(Vec3::zeros(), Quat::from_euler_angles(0.0, 0.0, 1.0));
        let mid = a.interpolate(&b, 0.5);

        assert_relative_eq!(mid.angular_distance(&a), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_isometry_round_trip() {
        let pose = Pose::new(Vec3::new(0.1, -0.2, 0.3), Quat::from_euler_angles(0.3, 0.2, 0.1));
        let back = Pose::from_isometry(&pose.to_isometry());

        assert_relative_eq!(back.position, pose.position, epsilon = EPSILON);
        assert_relative_eq!(back.rotation, pose.rotation, epsilon = EPSILON);
    }

    #[test]
    fn test_approach() {
        assert_relative_eq!(utils::approach(0.0, 1.0, 0.25), 0.25);
        assert_relative_eq!(utils::approach(1.0, 0.0, 0.25), 0.75);
        assert_relative_eq!(utils::approach(0.9, 1.0, 0.25), 1.0);
    }
}
