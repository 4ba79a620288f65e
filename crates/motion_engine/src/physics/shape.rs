//! Box collision shapes and axis-aligned bounds
//!
//! Shapes are stored in the actor's local frame and moved to world space
//! on demand, the same way the scene stores poses separately from geometry.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Pose, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Height of the top face
    pub fn top(&self) -> f64 {
        self.max.z
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Check if the horizontal footprints overlap (strictly, touching edges do not count)
    pub fn overlaps_footprint(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y
    }

    /// Check if a point lies inside the horizontal footprint
    pub fn footprint_contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Box collision shape described by its half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    /// Half size along each local axis
    pub half_size: [f64; 3],
}

impl BoxShape {
    /// Create a box from half extents
    pub fn new(half_size: [f64; 3]) -> Self {
        Self { half_size }
    }

    /// Half extents as a vector
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.half_size[0], self.half_size[1], self.half_size[2])
    }

    /// Whether every half extent is strictly positive and finite
    pub fn is_valid(&self) -> bool {
        self.half_size.iter().all(|h| h.is_finite() && *h > 0.0)
    }

    /// World-space bounds of this box placed at `pose`
    pub fn world_aabb(&self, pose: &Pose) -> Aabb {
        let rotation = pose.rotation.to_rotation_matrix();
        let half = self.half_extents();
        // Extent of a rotated box along each world axis
        let extents = rotation.matrix().abs() * half;
        Aabb::from_center_extents(pose.position, extents)
    }
}
