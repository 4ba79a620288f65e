//! Trajectory and gripper execution against the simulated scene

use serde::{Deserialize, Serialize};

use super::{ArmController, Planner, PlanningError, Trajectory};
use crate::foundation::math::Pose;
use crate::scene::{Scene, FINGER_CLOSED, FINGER_OPEN};

/// Executor parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Scene steps spent on each gripper open/close
    pub gripper_steps: u32,

    /// Try the straight-line plan before the clearance plan
    pub with_screw: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            gripper_steps: 100,
            with_screw: true,
        }
    }
}

/// Controller that plans with [`Planner`] and plays results back in the scene
pub struct SimController {
    planner: Planner,
    config: ExecutorConfig,
    moves: usize,
}

impl SimController {
    /// Create a controller
    pub fn new(planner: Planner, config: ExecutorConfig) -> Self {
        Self {
            planner,
            config,
            moves: 0,
        }
    }

    /// Successful moves so far
    pub fn move_count(&self) -> usize {
        self.moves
    }

    /// Plan with the screw strategy, falling back to the clearance strategy
    pub fn plan(&self, scene: &Scene, pose: &Pose) -> Result<Trajectory, PlanningError> {
        if !self.config.with_screw {
            return self.planner.plan_with_clearance(scene, pose);
        }

        match self.planner.plan_screw(scene, pose) {
            Ok(trajectory) => Ok(trajectory),
            Err(PlanningError::Collision { waypoint, obstacle }) => {
                log::warn!(
                    "Screw motion hits '{}' at waypoint {}, retrying with clearance motion",
                    obstacle,
                    waypoint
                );
                self.planner.plan_with_clearance(scene, pose)
            }
            Err(err) => Err(err),
        }
    }

    /// Play a trajectory back, one scene step per waypoint
    pub fn follow_path(&self, scene: &mut Scene, trajectory: &Trajectory) -> Result<(), PlanningError> {
        for pose in trajectory.poses().skip(1) {
            scene.set_hand_pose(*pose)?;
            scene.step()?;
        }
        Ok(())
    }

    fn actuate_gripper(&self, scene: &mut Scene, target: f64) -> Result<(), PlanningError> {
        scene.robot_mut()?.set_finger_targets(target);
        for _ in 0..self.config.gripper_steps {
            scene.step()?;
        }
        Ok(())
    }
}

impl ArmController for SimController {
    fn move_to_pose(&mut self, scene: &mut Scene, pose: &Pose) -> Result<(), PlanningError> {
        let trajectory = self.plan(scene, pose)?;
        self.follow_path(scene, &trajectory)?;
        self.moves += 1;
        Ok(())
    }

    fn open_gripper(&mut self, scene: &mut Scene) -> Result<(), PlanningError> {
        let released = scene.detach_from_gripper()?;
        self.actuate_gripper(scene, FINGER_OPEN)?;

        if let Some(id) = released {
            let drop = scene.settle(id)?;
            log::debug!("Released '{}' (fell {:.4}m)", scene.actor(id)?.name(), drop);
        }
        Ok(())
    }

    fn close_gripper(&mut self, scene: &mut Scene) -> Result<(), PlanningError> {
        let robot = scene.robot()?;
        let tip = robot.tcp_pose().position;
        let gap = robot.finger_gap();

        if robot.grasp().is_none() {
            if let Some(id) = scene.dynamic_actor_at(tip) {
                let actor = scene.actor(id)?;
                let extents = actor.world_aabb().extents();
                let width = 2.0 * extents.x.min(extents.y);
                if width <= gap {
                    log::debug!("Grasping '{}'", actor.name());
                    scene.attach_to_gripper(id)?;
                } else {
                    log::warn!(
                        "'{}' is {:.3}m wide but the fingers are only {:.3}m apart",
                        actor.name(),
                        width,
                        gap
                    );
                }
            }
        }

        self.actuate_gripper(scene, FINGER_CLOSED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::planning::PlannerConfig;
    use crate::scene::{ActorId, RobotConfig, SceneConfig};
    use approx::assert_relative_eq;

    fn down(x: f64, y: f64, z: f64) -> Pose {
        Pose::from_pose_vec(&[x, y, z, 0.0, 1.0, 0.0, 0.0]).unwrap()
    }

    fn setup() -> (Scene, SimController, ActorId) {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let table = scene
            .create_actor_builder()
            .add_box_collision([0.4, 0.4, 0.025])
            .build_kinematic("table")
            .unwrap();
        scene.set_pose(table, Pose::from_position(Vec3::new(0.56, 0.0, -0.025))).unwrap();
        let cube = scene
            .create_actor_builder()
            .add_box_collision([0.02, 0.02, 0.06])
            .build("red_cube")
            .unwrap();
        scene.set_pose(cube, Pose::from_position(Vec3::new(0.4, 0.3, 0.06))).unwrap();
        scene.load_robot(RobotConfig::default()).unwrap();

        let planner = Planner::new(PlannerConfig::default()).unwrap();
        (scene, SimController::new(planner, ExecutorConfig::default()), cube)
    }

    #[test]
    fn test_move_reaches_goal() {
        let (mut scene, mut controller, _) = setup();
        let goal = down(0.4, 0.3, 0.32);

        controller.move_to_pose(&mut scene, &goal).unwrap();
        assert_relative_eq!(scene.robot().unwrap().hand_pose().position, goal.position, epsilon = 1e-12);
        assert_eq!(controller.move_count(), 1);
        assert!(scene.step_count() > 0);
    }

    #[test]
    fn test_failed_move_leaves_robot_in_place() {
        let (mut scene, mut controller, _) = setup();
        let before = scene.robot().unwrap().hand_pose();

        let result = controller.move_to_pose(&mut scene, &down(2.0, 0.0, 0.3));
        assert!(matches!(result, Err(PlanningError::Unreachable { .. })));
        assert_eq!(scene.robot().unwrap().hand_pose(), before);
        assert_eq!(controller.move_count(), 0);
    }

    #[test]
    fn test_gripper_actions_step_the_scene() {
        let (mut scene, mut controller, _) = setup();

        controller.open_gripper(&mut scene).unwrap();
        assert_eq!(scene.step_count(), 100);
        assert_relative_eq!(scene.robot().unwrap().finger_gap(), 0.08, epsilon = 1e-12);

        // Closing on nothing is fine
        controller.close_gripper(&mut scene).unwrap();
        assert_eq!(scene.held_actor(), None);
        assert_relative_eq!(scene.robot().unwrap().finger_gap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pick_lift_and_place() {
        let (mut scene, mut controller, cube) = setup();

        controller.move_to_pose(&mut scene, &down(0.4, 0.3, 0.32)).unwrap();
        controller.open_gripper(&mut scene).unwrap();
        controller.move_to_pose(&mut scene, &down(0.4, 0.3, 0.20)).unwrap();
        controller.close_gripper(&mut scene).unwrap();

        assert_eq!(scene.held_actor(), Some(cube));
        // Fingers stop on the cube faces
        assert_relative_eq!(scene.robot().unwrap().finger_gap(), 0.04, epsilon = 1e-12);

        controller.move_to_pose(&mut scene, &down(0.4, 0.3, 0.32)).unwrap();
        assert_relative_eq!(scene.pose(cube).unwrap().position.z, 0.18, epsilon = 1e-9);

        controller.move_to_pose(&mut scene, &down(0.5, 0.3, 0.32)).unwrap();
        controller.move_to_pose(&mut scene, &down(0.5, 0.3, 0.20)).unwrap();
        controller.open_gripper(&mut scene).unwrap();

        assert_eq!(scene.held_actor(), None);
        assert_relative_eq!(
            scene.pose(cube).unwrap().position,
            Vec3::new(0.5, 0.3, 0.06),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_closed_fingers_cannot_grasp() {
        let (mut scene, mut controller, _) = setup();

        controller.move_to_pose(&mut scene, &down(0.4, 0.3, 0.20)).unwrap();
        controller.close_gripper(&mut scene).unwrap();

        assert_eq!(scene.held_actor(), None);
    }

    #[test]
    fn test_clearance_only_mode() {
        let (mut scene, _, _) = setup();
        let planner = Planner::new(PlannerConfig::default()).unwrap();
        let mut controller = SimController::new(planner, ExecutorConfig { with_screw: false, ..Default::default() });

        let goal = down(0.4, -0.2, 0.3);
        controller.move_to_pose(&mut scene, &goal).unwrap();
        assert_relative_eq!(scene.robot().unwrap().hand_pose().position, goal.position, epsilon = 1e-12);
    }
}
