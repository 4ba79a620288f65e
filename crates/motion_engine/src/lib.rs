//! # Motion Engine
//!
//! Scene, planning and choreography layer for a simulated pick-and-place arm.
//!
//! ## Features
//!
//! - **Scene**: Actors built from box shapes, a ground plane and a fixed time step
//! - **Robot**: Nine-joint arm with a parallel gripper, tracked in Cartesian space
//! - **Planning**: Straight-line (screw) plans with a clearance fallback
//! - **Choreography**: Scripted pick-and-place of every box in the layout
//! - **Configuration**: TOML or RON files with built-in defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use motion_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut director = SceneDirector::new(DemoConfig::default())?;
//!     director.initialize()?;
//!     let report = director.run_choreography()?;
//!     println!("Moved {} boxes", report.boxes.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod foundation;
pub mod config;
pub mod physics;
pub mod scene;
pub mod planning;
pub mod director;

mod engine;

pub use engine::{Engine, EngineConfig, EngineError};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError,
        config::{Config, ConfigError, ConfigFormat},
        director::{
            Action, ChoreographyOffsets, ChoreographyReport, DemoConfig, DirectorError, SceneDirector,
        },
        foundation::{
            math::{Pose, PoseVec, Vec3},
            time::Stopwatch,
        },
        planning::{ArmController, PlanningError},
        scene::{ActorId, Scene, SceneError},
    };
}
