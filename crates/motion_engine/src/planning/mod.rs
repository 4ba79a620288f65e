//! Motion planning and execution
//!
//! [`ArmController`] is the seam between the choreography and whatever moves
//! the arm. [`SimController`] implements it on top of the scene with the
//! Cartesian [`Planner`]; other backends plug in by implementing the trait.

mod executor;
mod planner;
mod trajectory;

pub use executor::{ExecutorConfig, SimController};
pub use planner::{Planner, PlannerConfig};
pub use trajectory::{Trajectory, Waypoint};

use thiserror::Error;

use crate::foundation::math::Pose;
use crate::scene::{Scene, SceneError};

/// Blocking arm and gripper commands
///
/// Each call returns once the action has finished in the scene, or with the
/// error that stopped it.
pub trait ArmController {
    /// Plan to `pose` (hand frame) and execute the plan
    fn move_to_pose(&mut self, scene: &mut Scene, pose: &Pose) -> Result<(), PlanningError>;

    /// Open the gripper, releasing anything it holds
    fn open_gripper(&mut self, scene: &mut Scene) -> Result<(), PlanningError>;

    /// Close the gripper, grasping what lies between the fingers
    fn close_gripper(&mut self, scene: &mut Scene) -> Result<(), PlanningError>;
}

/// Planning and execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Target lies outside the arm's workspace
    #[error("Target is {distance:.3}m from the shoulder, reach is {reach:.3}m")]
    Unreachable {
        /// Distance from the shoulder to the target
        distance: f64,
        /// Configured reach
        reach: f64,
    },

    /// Fingertip would enter an obstacle
    #[error("Path collides with '{obstacle}' at waypoint {waypoint}")]
    Collision {
        /// Index of the first colliding waypoint
        waypoint: usize,
        /// Name of the obstacle
        obstacle: String,
    },

    /// Planner parameters are unusable
    #[error("Invalid planner configuration: {0}")]
    InvalidConfig(String),

    /// Scene error during planning or execution
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}
