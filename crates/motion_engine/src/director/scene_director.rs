//! Scene director implementation

use std::time::Duration;

use super::choreography::{pick_and_place, Action};
use super::layout::DemoConfig;
use super::DirectorError;
use crate::foundation::math::{Pose, Vec3};
use crate::foundation::time::Stopwatch;
use crate::scene::ActorId;
use crate::Engine;

/// What happened while handling one box
#[derive(Debug, Clone, PartialEq)]
pub struct BoxReport {
    /// Box name
    pub name: String,
    /// Completed arm moves
    pub moves: usize,
    /// Completed gripper actions
    pub gripper_actions: usize,
    /// Wall time spent on the box
    pub elapsed: Duration,
    /// Box position once its script finished
    pub final_position: Vec3,
}

/// Summary of a choreography run
#[derive(Debug, Clone, PartialEq)]
pub struct ChoreographyReport {
    /// One entry per box, in pick order
    pub boxes: Vec<BoxReport>,
    /// Simulated time at the end of the run
    pub sim_time: f64,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

/// Builds the demo scene and drives the pick-and-place script
pub struct SceneDirector {
    config: DemoConfig,
    engine: Engine,
    table: Option<ActorId>,
    boxes: Vec<ActorId>,
}

impl SceneDirector {
    /// Create a director; the configuration is validated but nothing is built yet
    pub fn new(config: DemoConfig) -> Result<Self, DirectorError> {
        config.validate()?;
        let engine = Engine::new(config.engine.clone());

        Ok(Self {
            config,
            engine,
            table: None,
            boxes: Vec::new(),
        })
    }

    /// Demo configuration
    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// The engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Mutable access to the engine
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Whether [`initialize`](Self::initialize) has completed
    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Set up the engine, place the table and boxes, and set the initial joints
    pub fn initialize(&mut self) -> Result<(), DirectorError> {
        if self.is_initialized() {
            return Err(DirectorError::AlreadyInitialized);
        }

        self.engine.setup_scene()?;
        self.engine.load_robot()?;
        self.engine.setup_planner()?;

        let layout = &self.config.layout;
        let scene = self.engine.scene_mut()?;

        let table = &layout.table;
        let table_id = scene
            .create_actor_builder()
            .add_box_collision(table.half_size)
            .add_box_visual(table.half_size, table.color)
            .build_kinematic(&table.name)?;
        scene.set_pose(table_id, Pose::from_position(Vec3::from(table.position)))?;

        let mut boxes = Vec::with_capacity(layout.boxes.len());
        for prop in &layout.boxes {
            let id = scene
                .create_actor_builder()
                .add_box_collision(prop.half_size)
                .add_box_visual(prop.half_size, prop.color)
                .build(&prop.name)?;
            scene.set_pose(id, Pose::from_position(Vec3::from(prop.position)))?;
            log::debug!("Placed '{}' at {:?}", prop.name, prop.position);
            boxes.push(id);
        }

        scene.robot_mut()?.set_qpos(&layout.init_qpos)?;

        log::info!(
            "Scene ready: '{}' and {} boxes, robot at {:?}",
            table.name,
            boxes.len(),
            layout.init_qpos
        );
        self.table = Some(table_id);
        self.boxes = boxes;
        Ok(())
    }

    /// Pick every box at its target and place it `place_shift` further along x
    ///
    /// Stops at the first failing action and returns its error.
    pub fn run_choreography(&mut self) -> Result<ChoreographyReport, DirectorError> {
        if !self.is_initialized() {
            return Err(DirectorError::NotInitialized);
        }

        let run_timer = Stopwatch::start_new();
        let mut reports = Vec::with_capacity(self.boxes.len());

        for (index, target) in self.config.layout.targets.iter().enumerate() {
            let name = self.config.layout.boxes[index].name.clone();
            let id = self.boxes[index];
            let script = pick_and_place(target, &self.config.offsets)?;

            log::info!("Picking '{}' at [{:.3}, {:.3}, {:.3}]", name, target[0], target[1], target[2]);
            let timer = Stopwatch::start_new();
            let mut moves = 0;
            let mut gripper_actions = 0;

            for scripted in &script {
                log::debug!("'{}' step {}: {:?}", name, scripted.step, scripted.action);
                let result = match &scripted.action {
                    Action::MoveTo(pose) => self.engine.move_to_pose(pose).map(|()| moves += 1),
                    Action::OpenGripper => self.engine.open_gripper().map(|()| gripper_actions += 1),
                    Action::CloseGripper => self.engine.close_gripper().map(|()| gripper_actions += 1),
                };
                result.map_err(|source| DirectorError::Step {
                    step: scripted.step,
                    box_name: name.clone(),
                    source,
                })?;
            }

            let final_position = self.engine.scene()?.pose(id)?.position;
            log::info!(
                "Placed '{}' at [{:.3}, {:.3}, {:.3}] in {:.1}ms",
                name,
                final_position.x,
                final_position.y,
                final_position.z,
                timer.elapsed_millis()
            );

            reports.push(BoxReport {
                name,
                moves,
                gripper_actions,
                elapsed: timer.elapsed(),
                final_position,
            });
        }

        Ok(ChoreographyReport {
            boxes: reports,
            sim_time: self.engine.scene()?.time(),
            elapsed: run_timer.elapsed(),
        })
    }

    /// Current position of every box, in layout order
    pub fn box_positions(&self) -> Result<Vec<(String, Vec3)>, DirectorError> {
        let scene = self.engine.scene()?;
        self.boxes
            .iter()
            .map(|&id| -> Result<(String, Vec3), DirectorError> {
                let actor = scene.actor(id)?;
                Ok((actor.name().to_string(), actor.pose().position))
            })
            .collect()
    }

    /// Handle of the table actor
    pub fn table(&self) -> Result<ActorId, DirectorError> {
        self.table.ok_or(DirectorError::NotInitialized)
    }
}
