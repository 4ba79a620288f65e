//! Cartesian motion planner
//!
//! Two strategies produce hand-pose trajectories:
//! - screw motion: a straight line in position with a slerp in rotation
//! - clearance motion: lift to a safe height, traverse, then descend
//!
//! Every waypoint is checked against the reach sphere around the shoulder
//! and the fingertip point is checked against environment geometry.

use serde::{Deserialize, Serialize};

use super::{PlanningError, Trajectory};
use crate::foundation::math::{Pose, Vec3};
use crate::physics::CollisionLayers;
use crate::scene::Scene;

/// Smallest accepted sampling step; keeps waypoint counts bounded
const MIN_TIME_STEP: f64 = 1e-4;

/// Planner parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Trajectory sampling step in seconds
    pub time_step: f64,

    /// Maximum Cartesian hand speed (m/s)
    pub max_linear_speed: f64,

    /// Maximum hand angular speed (rad/s)
    pub max_angular_speed: f64,

    /// Radius of the reachable sphere around the shoulder
    pub reach: f64,

    /// Minimum hand height used by the clearance strategy
    pub clearance_height: f64,

    /// Layers the fingertip must stay out of
    pub collision_mask: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 250.0,
            max_linear_speed: 0.25,
            max_angular_speed: 1.0,
            reach: 0.855,
            clearance_height: 0.4,
            collision_mask: CollisionLayers::gripper_mask(),
        }
    }
}

/// Plans hand trajectories inside a scene
#[derive(Debug, Clone)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Create a planner, validating its parameters
    pub fn new(config: PlannerConfig) -> Result<Self, PlanningError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !(config.time_step.is_finite() && config.time_step >= MIN_TIME_STEP) {
            return Err(PlanningError::InvalidConfig(format!(
                "time_step {} is below {}",
                config.time_step, MIN_TIME_STEP
            )));
        }
        if !positive(config.max_linear_speed) || !positive(config.max_angular_speed) {
            return Err(PlanningError::InvalidConfig("speeds must be positive".to_string()));
        }
        if !positive(config.reach) {
            return Err(PlanningError::InvalidConfig(format!("reach {}", config.reach)));
        }

        Ok(Self { config })
    }

    /// Planner parameters
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Straight-line plan from the current hand pose to `goal`
    pub fn plan_screw(&self, scene: &Scene, goal: &Pose) -> Result<Trajectory, PlanningError> {
        let start = scene.robot()?.hand_pose();
        self.check_reachable(scene, goal)?;

        let mut trajectory = Trajectory::new(self.config.time_step);
        trajectory.push(start);
        trajectory.extend_towards(goal, self.samples_between(&start, goal));

        self.check_collisions(scene, &trajectory)?;
        log::debug!(
            "Screw plan: {} waypoints over {:.3}s",
            trajectory.len(),
            trajectory.duration()
        );
        Ok(trajectory)
    }

    /// Lift-traverse-descend plan from the current hand pose to `goal`
    pub fn plan_with_clearance(&self, scene: &Scene, goal: &Pose) -> Result<Trajectory, PlanningError> {
        let start = scene.robot()?.hand_pose();
        self.check_reachable(scene, goal)?;

        let height = self
            .config
            .clearance_height
            .max(start.position.z)
            .max(goal.position.z);
        let lifted = Pose::new(Vec3::new(start.position.x, start.position.y, height), start.rotation);
        let above_goal = Pose::new(Vec3::new(goal.position.x, goal.position.y, height), goal.rotation);
        self.check_reachable(scene, &lifted)?;
        self.check_reachable(scene, &above_goal)?;

        let mut trajectory = Trajectory::new(self.config.time_step);
        trajectory.push(start);
        for target in [lifted, above_goal, *goal] {
            let from = trajectory.last().copied().unwrap_or(start);
            trajectory.extend_towards(&target, self.samples_between(&from, &target));
        }

        self.check_collisions(scene, &trajectory)?;
        log::debug!(
            "Clearance plan via z={:.3}: {} waypoints over {:.3}s",
            height,
            trajectory.len(),
            trajectory.duration()
        );
        Ok(trajectory)
    }

    /// Number of samples needed to move between two poses within the speed limits
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn samples_between(&self, from: &Pose, to: &Pose) -> usize {
        let linear = from.linear_distance(to) / self.config.max_linear_speed;
        let angular = from.angular_distance(to) / self.config.max_angular_speed;
        let duration = linear.max(angular);

        ((duration / self.config.time_step).ceil() as usize).max(1)
    }

    fn check_reachable(&self, scene: &Scene, pose: &Pose) -> Result<(), PlanningError> {
        let distance = (pose.position - scene.robot()?.shoulder()).magnitude();
        if distance > self.config.reach {
            return Err(PlanningError::Unreachable {
                distance,
                reach: self.config.reach,
            });
        }
        Ok(())
    }

    fn check_collisions(&self, scene: &Scene, trajectory: &Trajectory) -> Result<(), PlanningError> {
        let robot = scene.robot()?;

        for (index, hand) in trajectory.poses().enumerate() {
            let tip = robot.tcp_pose_for(hand).position;
            if let Some(obstacle) = scene.point_collides(tip, CollisionLayers::GRIPPER, self.config.collision_mask) {
                return Err(PlanningError::Collision {
                    waypoint: index,
                    obstacle,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RobotConfig, SceneConfig};
    use approx::assert_relative_eq;

    fn down(x: f64, y: f64, z: f64) -> Pose {
        Pose::from_pose_vec(&[x, y, z, 0.0, 1.0, 0.0, 0.0]).unwrap()
    }

    fn scene_with_robot() -> Scene {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let table = scene
            .create_actor_builder()
            .add_box_collision([0.4, 0.4, 0.025])
            .build_kinematic("table")
            .unwrap();
        scene.set_pose(table, Pose::from_position(Vec3::new(0.56, 0.0, -0.025))).unwrap();
        scene.load_robot(RobotConfig::default()).unwrap();
        scene
    }

    fn planner() -> Planner {
        Planner::new(PlannerConfig::default()).unwrap()
    }

    #[test]
    fn test_screw_plan_is_straight_and_time_stamped() {
        let scene = scene_with_robot();
        let goal = down(0.4, 0.3, 0.32);
        let trajectory = planner().plan_screw(&scene, &goal).unwrap();

        let start = scene.robot().unwrap().hand_pose();
        assert_eq!(trajectory.first(), Some(&start));
        assert_relative_eq!(trajectory.last().unwrap().position, goal.position, epsilon = 1e-12);

        // Every sample lies on the segment between start and goal
        let direction = (goal.position - start.position).normalize();
        for pose in trajectory.poses() {
            let offset = pose.position - start.position;
            assert_relative_eq!(offset.cross(&direction).magnitude(), 0.0, epsilon = 1e-9);
        }

        let expected = (goal.position - start.position).magnitude() / 0.25;
        assert!(trajectory.duration() >= expected - 1e-9);
        assert!(trajectory.duration() < expected + 2.0 / 250.0);
    }

    #[test]
    fn test_unreachable_goal() {
        let scene = scene_with_robot();
        let result = planner().plan_screw(&scene, &down(1.5, 0.0, 0.3));

        assert!(matches!(result, Err(PlanningError::Unreachable { .. })));
    }

    #[test]
    fn test_goal_inside_table_collides() {
        let scene = scene_with_robot();
        // Fingertip ends 0.0234m below the table top
        let result = planner().plan_screw(&scene, &down(0.5, 0.0, 0.08));

        assert!(matches!(result, Err(PlanningError::Collision { obstacle, .. }) if obstacle == "table"));
    }

    #[test]
    fn test_clearance_plan_goes_over_a_wall() {
        let mut scene = scene_with_robot();
        let wall = scene
            .create_actor_builder()
            .add_box_collision([0.01, 0.3, 0.125])
            .build_kinematic("wall")
            .unwrap();
        scene.set_pose(wall, Pose::from_position(Vec3::new(0.45, 0.0, 0.125))).unwrap();
        scene.set_hand_pose(down(0.35, 0.0, 0.3)).unwrap();

        let goal = down(0.55, 0.0, 0.3);
        let planner = planner();
        let screw = planner.plan_screw(&scene, &goal);
        assert!(matches!(screw, Err(PlanningError::Collision { ref obstacle, .. }) if obstacle == "wall"));

        let trajectory = planner.plan_with_clearance(&scene, &goal).unwrap();
        let highest = trajectory.poses().map(|pose| pose.position.z).fold(f64::MIN, f64::max);
        assert_relative_eq!(highest, 0.4, epsilon = 1e-12);
        assert_relative_eq!(trajectory.last().unwrap().position, goal.position, epsilon = 1e-12);
    }

    #[test]
    fn test_samples_between_respects_rotation_limit() {
        let planner = planner();
        let a = down(0.4, 0.0, 0.3);
        let b = Pose::new(a.position, a.rotation * crate::foundation::math::Quat::from_euler_angles(0.0, 0.0, 1.0));

        // 1 rad at 1 rad/s sampled at 250Hz
        let samples = planner.samples_between(&a, &b);
        assert!((250..=251).contains(&samples), "got {samples}");
        assert_eq!(planner.samples_between(&a, &a), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlannerConfig { time_step: 0.0, ..Default::default() };
        assert!(matches!(Planner::new(config), Err(PlanningError::InvalidConfig(_))));
    }

    #[test]
    fn test_tiny_time_step_rejected() {
        for time_step in [1e-300, 1e-6, f64::NAN] {
            let config = PlannerConfig { time_step, ..Default::default() };
            assert!(
                matches!(Planner::new(config), Err(PlanningError::InvalidConfig(_))),
                "time_step {time_step}"
            );
        }

        let config = PlannerConfig { time_step: MIN_TIME_STEP, ..Default::default() };
        assert!(Planner::new(config).is_ok());
    }
}
