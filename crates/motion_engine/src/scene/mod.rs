//! Scene management
//!
//! The scene is the simulated world the demo runs in:
//!
//! ```text
//! Scene
//!  ├── ground plane (optional, z = ground_height)
//!  ├── actors (SlotMap<ActorId, Actor>)   built via ActorBuilder
//!  └── robot  (Robot)                     joint state, hand pose, grasp
//! ```
//!
//! Actors are assembled with [`Scene::create_actor_builder`] and placed with
//! [`Scene::set_pose`]. The robot is loaded once with [`Scene::load_robot`].

mod actor;
mod robot;
mod world;

pub use actor::{Actor, ActorBuilder, ActorId, BodyKind, VisualShape};
pub use robot::{
    Grasp, Robot, RobotConfig, ARM_DOF, FINGER_CLOSED, FINGER_OPEN, GRIPPER_DOF, ROBOT_DOF,
};
pub use world::{Scene, SceneConfig};

use thiserror::Error;

/// Scene errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Handle does not refer to a live actor
    #[error("Unknown actor {0:?}")]
    UnknownActor(ActorId),

    /// Actor names must be unique within a scene
    #[error("An actor named '{0}' already exists")]
    DuplicateName(String),

    /// Actor has no collision geometry
    #[error("Actor '{0}' has no collision shape")]
    MissingCollision(String),

    /// Actor has a shape with a non-positive or non-finite half size
    #[error("Actor '{0}' has an invalid shape")]
    InvalidShape(String),

    /// Nothing underneath a body to rest on
    #[error("Actor '{0}' has no support below it")]
    NoSupport(String),

    /// Wrong number of joint values
    #[error("Expected {expected} joint values, got {got}")]
    JointCount {
        /// Joints of the articulation
        expected: usize,
        /// Values supplied
        got: usize,
    },

    /// Joint value is NaN or infinite
    #[error("Joint value {0} is not finite")]
    NonFiniteJoint(usize),

    /// No robot has been loaded
    #[error("No robot loaded")]
    NoRobot,

    /// A robot is already present
    #[error("Robot already loaded")]
    RobotAlreadyLoaded,

    /// Time step must be positive and finite
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f64),
}
