//! The simulated world
//!
//! Owns every actor, the ground plane and the robot, and advances simulated
//! time in fixed steps. Dynamic actors are not integrated; they move when the
//! robot carries them and drop straight down onto their support when
//! released.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::actor::{Actor, ActorBuilder, ActorId, BodyKind};
use super::robot::{Robot, RobotConfig, FINGER_CLOSED};
use super::SceneError;
use crate::foundation::math::{Pose, Vec3};
use crate::physics::{Aabb, CollisionLayers};

/// Tolerance used when deciding whether a surface lies below a body
const SUPPORT_TOLERANCE: f64 = 1e-3;

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Simulation time step in seconds
    pub timestep: f64,

    /// Height of the ground plane, `None` for no ground
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_height: Option<f64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 240.0,
            ground_height: Some(0.0),
        }
    }
}

/// Simulated world holding actors and the robot
pub struct Scene {
    config: SceneConfig,
    actors: SlotMap<ActorId, Actor>,
    names: HashMap<String, ActorId>,
    robot: Option<Robot>,
    step_count: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        if !(config.timestep.is_finite() && config.timestep > 0.0) {
            return Err(SceneError::InvalidTimestep(config.timestep));
        }

        log::debug!(
            "Creating scene (timestep {:.5}s, ground {:?})",
            config.timestep,
            config.ground_height
        );

        Ok(Self {
            config,
            actors: SlotMap::with_key(),
            names: HashMap::new(),
            robot: None,
            step_count: 0,
        })
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Start assembling a new actor
    pub fn create_actor_builder(&mut self) -> ActorBuilder<'_> {
        ActorBuilder::new(self)
    }

    pub(crate) fn insert_actor(&mut self, actor: Actor) -> Result<ActorId, SceneError> {
        if self.names.contains_key(actor.name()) {
            return Err(SceneError::DuplicateName(actor.name().to_string()));
        }

        let name = actor.name().to_string();
        log::debug!("Adding {:?} actor '{}'", actor.kind(), name);
        let id = self.actors.insert(actor);
        self.names.insert(name, id);
        Ok(id)
    }

    /// Remove an actor; releases it first if the robot holds it
    pub fn remove_actor(&mut self, id: ActorId) -> Result<Actor, SceneError> {
        if let Some(robot) = self.robot.as_mut() {
            if robot.grasp().is_some_and(|grasp| grasp.actor == id) {
                robot.detach();
            }
        }

        let actor = self.actors.remove(id).ok_or(SceneError::UnknownActor(id))?;
        self.names.remove(actor.name());
        Ok(actor)
    }

    /// Look up an actor
    pub fn actor(&self, id: ActorId) -> Result<&Actor, SceneError> {
        self.actors.get(id).ok_or(SceneError::UnknownActor(id))
    }

    /// Find an actor by name
    pub fn find(&self, name: &str) -> Option<ActorId> {
        self.names.get(name).copied()
    }

    /// Iterate over all actors
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors.iter()
    }

    /// Number of actors
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Place an actor
    pub fn set_pose(&mut self, id: ActorId, pose: Pose) -> Result<(), SceneError> {
        let actor = self.actors.get_mut(id).ok_or(SceneError::UnknownActor(id))?;
        actor.set_pose(pose);
        Ok(())
    }

    /// Current pose of an actor
    pub fn pose(&self, id: ActorId) -> Result<Pose, SceneError> {
        self.actor(id).map(Actor::pose)
    }

    /// Load the robot into the scene
    pub fn load_robot(&mut self, config: RobotConfig) -> Result<&mut Robot, SceneError> {
        if self.robot.is_some() {
            return Err(SceneError::RobotAlreadyLoaded);
        }

        log::info!("Loading robot '{}'", config.name);
        Ok(self.robot.insert(Robot::new(config)))
    }

    /// The loaded robot
    pub fn robot(&self) -> Result<&Robot, SceneError> {
        self.robot.as_ref().ok_or(SceneError::NoRobot)
    }

    /// Mutable access to the loaded robot
    pub fn robot_mut(&mut self) -> Result<&mut Robot, SceneError> {
        self.robot.as_mut().ok_or(SceneError::NoRobot)
    }

    /// Move the robot hand; a held actor moves with it
    pub fn set_hand_pose(&mut self, pose: Pose) -> Result<(), SceneError> {
        self.robot_mut()?.set_hand_pose(pose);
        self.sync_held_actor()
    }

    /// Advance the simulation by one time step
    pub fn step(&mut self) -> Result<(), SceneError> {
        let dt = self.config.timestep;
        let min_finger = self.held_finger_stop();

        if let Some(robot) = self.robot.as_mut() {
            robot.step_fingers(dt, min_finger);
        }
        self.sync_held_actor()?;

        self.step_count += 1;
        Ok(())
    }

    /// Number of steps taken so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Simulated time in seconds
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self) -> f64 {
        self.step_count as f64 * self.config.timestep
    }

    /// Top of the highest surface under `footprint` that lies below `below`
    ///
    /// The ground counts everywhere; `exclude` and any held actor are skipped.
    pub fn support_height(&self, footprint: &Aabb, below: f64, exclude: Option<ActorId>) -> f64 {
        let held = self.held_actor();
        let ground = self.config.ground_height.unwrap_or(f64::NEG_INFINITY);

        self.actors
            .iter()
            .filter(|(id, _)| Some(*id) != exclude && Some(*id) != held)
            .map(|(_, actor)| actor.world_aabb())
            .filter(|aabb| aabb.overlaps_footprint(footprint) && aabb.top() <= below + SUPPORT_TOLERANCE)
            .map(|aabb| aabb.top())
            .fold(ground, f64::max)
    }

    /// Drop a dynamic actor straight down onto its support
    ///
    /// Returns the vertical distance it fell. Non-dynamic actors stay put.
    pub fn settle(&mut self, id: ActorId) -> Result<f64, SceneError> {
        let actor = self.actor(id)?;
        if actor.kind() != BodyKind::Dynamic {
            return Ok(0.0);
        }

        let aabb = actor.world_aabb();
        let support = self.support_height(&aabb, aabb.min.z, Some(id));
        if !support.is_finite() {
            return Err(SceneError::NoSupport(actor.name().to_string()));
        }

        let drop = aabb.min.z - support;
        let pose = actor.pose().translated(Vec3::new(0.0, 0.0, -drop));
        log::debug!("Settling '{}' by {:.4}m onto z={:.4}", actor.name(), drop, support);
        self.set_pose(id, pose)?;
        Ok(drop)
    }

    /// Whether a point lies inside any actor in `mask`, or below the ground
    pub fn point_collides(&self, point: Vec3, layer: u32, mask: u32) -> Option<String> {
        let hit = self
            .actors
            .values()
            .filter(|actor| CollisionLayers::should_collide(layer, mask, actor.layer(), actor.mask()))
            .find(|actor| {
                let aabb = actor.world_aabb();
                // Resting on a top face is contact, not penetration
                point.z < aabb.top() && aabb.contains_point(point)
            })
            .map(|actor| actor.name().to_string());
        if hit.is_some() {
            return hit;
        }

        match self.config.ground_height {
            Some(ground) if mask & CollisionLayers::GROUND != 0 && point.z < ground => {
                Some("ground".to_string())
            }
            _ => None,
        }
    }

    /// Dynamic actor whose bounds contain `point`, if any
    pub fn dynamic_actor_at(&self, point: Vec3) -> Option<ActorId> {
        self.actors
            .iter()
            .filter(|(_, actor)| actor.kind() == BodyKind::Dynamic)
            .find(|(_, actor)| actor.world_aabb().contains_point(point))
            .map(|(id, _)| id)
    }

    /// Actor currently held by the robot
    pub fn held_actor(&self) -> Option<ActorId> {
        self.robot.as_ref().and_then(|robot| robot.grasp()).map(|grasp| grasp.actor)
    }

    pub(crate) fn attach_to_gripper(&mut self, id: ActorId) -> Result<(), SceneError> {
        let pose = self.pose(id)?;
        self.robot_mut()?.attach(id, &pose);
        Ok(())
    }

    pub(crate) fn detach_from_gripper(&mut self) -> Result<Option<ActorId>, SceneError> {
        Ok(self.robot_mut()?.detach().map(|grasp| grasp.actor))
    }

    fn sync_held_actor(&mut self) -> Result<(), SceneError> {
        let held = self.robot.as_ref().and_then(Robot::held_pose);
        if let Some((id, pose)) = held {
            self.set_pose(id, pose)?;
        }
        Ok(())
    }

    /// Finger position at which closing fingers meet the held actor's faces
    fn held_finger_stop(&self) -> f64 {
        self.held_actor()
            .and_then(|id| self.actors.get(id))
            .and_then(|actor| actor.collisions().first())
            .map_or(FINGER_CLOSED, |shape| shape.half_size[0].min(shape.half_size[1]))
    }
}
