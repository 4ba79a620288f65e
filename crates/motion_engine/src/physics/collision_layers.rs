//! Collision layer system for filtering collision checks
//!
//! Each actor carries a layer (what it is) and a mask (what it collides
//! with). The planner tests the gripper against actors whose layer is in
//! its mask.

/// Collision layer definitions
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Ground plane and other static geometry
    pub const GROUND: u32 = 1 << 0;

    /// Fixed furniture such as tables (kinematic bodies)
    pub const ENVIRONMENT: u32 = 1 << 1;

    /// Movable props the robot may grasp
    pub const PROP: u32 = 1 << 2;

    /// The robot's gripper
    pub const GRIPPER: u32 = 1 << 3;

    /// Check if two actors should collide based on their layers and masks
    ///
    /// # Example
    /// ```
    /// use motion_engine::physics::CollisionLayers;
    ///
    /// let gripper_mask = CollisionLayers::GROUND | CollisionLayers::ENVIRONMENT;
    /// assert!(CollisionLayers::should_collide(
    ///     CollisionLayers::GRIPPER, gripper_mask,
    ///     CollisionLayers::ENVIRONMENT, CollisionLayers::ALL,
    /// ));
    /// ```
    pub fn should_collide(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
        // A's layer must be in B's mask AND B's layer must be in A's mask
        (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }

    /// Mask used by the gripper when planning: everything that cannot be grasped
    pub fn gripper_mask() -> u32 {
        Self::mask(&[Self::GROUND, Self::ENVIRONMENT])
    }
}
