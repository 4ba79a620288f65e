//! Demo engine: scene, robot and planner setup
//!
//! Setup happens in three ordered stages, each a separate call:
//! [`Engine::setup_scene`], [`Engine::load_robot`], [`Engine::setup_planner`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::Pose;
use crate::planning::{ArmController, ExecutorConfig, Planner, PlannerConfig, PlanningError, SimController};
use crate::scene::{RobotConfig, Scene, SceneConfig, SceneError};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scene settings
    pub scene: SceneConfig,

    /// Robot settings
    pub robot: RobotConfig,

    /// Planner settings
    pub planner: PlannerConfig,

    /// Trajectory/gripper execution settings
    pub executor: ExecutorConfig,
}

/// Owns the scene and the arm controller
pub struct Engine {
    config: EngineConfig,
    scene: Option<Scene>,
    controller: Option<Box<dyn ArmController>>,
}

impl Engine {
    /// Create an engine; nothing is set up yet
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            scene: None,
            controller: None,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create the scene (time step and ground plane)
    pub fn setup_scene(&mut self) -> Result<(), EngineError> {
        log::info!("Setting up scene...");
        self.scene = Some(Scene::new(self.config.scene.clone())?);
        Ok(())
    }

    /// Load the robot into the scene
    pub fn load_robot(&mut self) -> Result<(), EngineError> {
        let robot_config = self.config.robot.clone();
        let scene = self.scene.as_mut().ok_or(EngineError::NotReady("scene"))?;
        scene.load_robot(robot_config)?;
        Ok(())
    }

    /// Build the planner and the simulated controller
    pub fn setup_planner(&mut self) -> Result<(), EngineError> {
        self.scene()?.robot().map_err(|_| EngineError::NotReady("robot"))?;

        let planner = Planner::new(self.config.planner.clone())?;
        log::info!(
            "Planner ready (time step {:.4}s, reach {:.3}m)",
            planner.config().time_step,
            planner.config().reach
        );
        self.controller = Some(Box::new(SimController::new(planner, self.config.executor.clone())));
        Ok(())
    }

    /// Replace the arm controller, e.g. with a hardware or recording backend
    pub fn set_controller(&mut self, controller: Box<dyn ArmController>) {
        self.controller = Some(controller);
    }

    /// The scene
    pub fn scene(&self) -> Result<&Scene, EngineError> {
        self.scene.as_ref().ok_or(EngineError::NotReady("scene"))
    }

    /// Mutable access to the scene
    pub fn scene_mut(&mut self) -> Result<&mut Scene, EngineError> {
        self.scene.as_mut().ok_or(EngineError::NotReady("scene"))
    }

    /// Move the hand to `pose`
    pub fn move_to_pose(&mut self, pose: &Pose) -> Result<(), EngineError> {
        let (scene, controller) = self.parts()?;
        controller.move_to_pose(scene, pose)?;
        Ok(())
    }

    /// Open the gripper
    pub fn open_gripper(&mut self) -> Result<(), EngineError> {
        let (scene, controller) = self.parts()?;
        controller.open_gripper(scene)?;
        Ok(())
    }

    /// Close the gripper
    pub fn close_gripper(&mut self) -> Result<(), EngineError> {
        let (scene, controller) = self.parts()?;
        controller.close_gripper(scene)?;
        Ok(())
    }

    fn parts(&mut self) -> Result<(&mut Scene, &mut (dyn ArmController + 'static)), EngineError> {
        let scene = self.scene.as_mut().ok_or(EngineError::NotReady("scene"))?;
        let controller = self.controller.as_deref_mut().ok_or(EngineError::NotReady("planner"))?;
        Ok((scene, controller))
    }
}

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A setup stage has not run yet
    #[error("{0} is not set up")]
    NotReady(&'static str),

    /// Scene error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Planning or execution error
    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),
}
