//! Scene director: builds the demo world and runs the pick-and-place script
//!
//! The director owns an [`Engine`](crate::Engine). [`SceneDirector::initialize`]
//! runs the engine setup stages and populates the scene from a
//! [`SceneLayout`]; [`SceneDirector::run_choreography`] then picks every box
//! at its target and puts it down again `place_shift` further along x.

mod choreography;
mod layout;
mod scene_director;

pub use choreography::{pick_and_place, Action, ChoreographyOffsets, ScriptedAction};
pub use layout::{BoxProp, DemoConfig, SceneLayout, TableSpec};
pub use scene_director::{BoxReport, ChoreographyReport, SceneDirector};

use thiserror::Error;

use crate::config::ConfigError;
use crate::foundation::math::PoseError;
use crate::scene::SceneError;
use crate::EngineError;

/// Director errors
#[derive(Error, Debug)]
pub enum DirectorError {
    /// `run_choreography` called before `initialize`
    #[error("Scene director is not initialized")]
    NotInitialized,

    /// `initialize` called twice
    #[error("Scene director is already initialized")]
    AlreadyInitialized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine setup error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene population error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Target pose is not a valid pose
    #[error("Invalid target pose: {0}")]
    Pose(#[from] PoseError),

    /// A scripted action failed
    #[error("Step {step} for '{box_name}' failed: {source}")]
    Step {
        /// Script step (1 through 7)
        step: u8,
        /// Box being handled
        box_name: String,
        /// The underlying failure
        source: EngineError,
    },
}
