//! Robot articulation state
//!
//! The arm is modeled kinematically: joint positions are stored as given and
//! the hand pose is tracked directly in Cartesian space. Solving between the
//! two belongs to an external kinematics backend.

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

use super::{ActorId, SceneError};
use crate::foundation::math::{utils, Pose, Vec3};

/// Number of arm joints
pub const ARM_DOF: usize = 7;

/// Number of finger joints
pub const GRIPPER_DOF: usize = 2;

/// Total joint count of the articulation
pub const ROBOT_DOF: usize = ARM_DOF + GRIPPER_DOF;

/// Finger joint position when fully open (per finger, meters)
pub const FINGER_OPEN: f64 = 0.04;

/// Finger joint position when fully closed
pub const FINGER_CLOSED: f64 = 0.0;

/// Robot loading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Articulation name
    pub name: String,

    /// Distance from the hand frame origin to the fingertip point along the hand z-axis
    pub tcp_offset: f64,

    /// Maximum finger joint speed (m/s)
    pub finger_speed: f64,

    /// Fixed base position
    pub base: [f64; 3],

    /// Height of the shoulder joint above the base
    pub shoulder_height: f64,

    /// Hand pose right after loading
    pub home_hand_pose: Pose,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: "panda".to_string(),
            tcp_offset: 0.1034,
            finger_speed: 0.1,
            base: [0.0, 0.0, 0.0],
            shoulder_height: 0.333,
            home_hand_pose: Pose::from_pose_vec(&[0.3, 0.0, 0.45, 0.0, 1.0, 0.0, 0.0])
                .unwrap_or_default(),
        }
    }
}

/// Rigid attachment of an actor to the fingertip frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grasp {
    /// The held actor
    pub actor: ActorId,
    /// Actor pose expressed in the fingertip frame
    pub offset: Isometry3<f64>,
}

/// Fixed-base arm with a parallel two-finger gripper
#[derive(Debug, Clone)]
pub struct Robot {
    config: RobotConfig,
    qpos: [f64; ROBOT_DOF],
    finger_targets: [f64; GRIPPER_DOF],
    hand_pose: Pose,
    grasp: Option<Grasp>,
}

impl Robot {
    /// Create a robot in its home configuration with closed fingers
    pub fn new(config: RobotConfig) -> Self {
        let hand_pose = config.home_hand_pose;
        Self {
            config,
            qpos: [0.0; ROBOT_DOF],
            finger_targets: [FINGER_CLOSED; GRIPPER_DOF],
            hand_pose,
            grasp: None,
        }
    }

    /// Articulation name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Loading parameters
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Set all joint positions; finger drive targets follow the finger values
    pub fn set_qpos(&mut self, qpos: &[f64]) -> Result<(), SceneError> {
        if qpos.len() != ROBOT_DOF {
            return Err(SceneError::JointCount {
                expected: ROBOT_DOF,
                got: qpos.len(),
            });
        }
        if let Some(index) = qpos.iter().position(|q| !q.is_finite()) {
            return Err(SceneError::NonFiniteJoint(index));
        }

        self.qpos.copy_from_slice(qpos);
        for finger in 0..GRIPPER_DOF {
            let value = utils::clamp(self.qpos[ARM_DOF + finger], FINGER_CLOSED, FINGER_OPEN);
            self.qpos[ARM_DOF + finger] = value;
            self.finger_targets[finger] = value;
        }
        Ok(())
    }

    /// All joint positions
    pub fn qpos(&self) -> &[f64; ROBOT_DOF] {
        &self.qpos
    }

    /// Arm joint positions
    pub fn arm_qpos(&self) -> &[f64] {
        &self.qpos[..ARM_DOF]
    }

    /// Current finger joint positions
    pub fn finger_qpos(&self) -> &[f64] {
        &self.qpos[ARM_DOF..]
    }

    /// Distance between the two fingers
    pub fn finger_gap(&self) -> f64 {
        self.finger_qpos().iter().sum()
    }

    /// Drive both fingers towards `target`, clamped to the joint range
    pub fn set_finger_targets(&mut self, target: f64) {
        let target = utils::clamp(target, FINGER_CLOSED, FINGER_OPEN);
        self.finger_targets = [target; GRIPPER_DOF];
    }

    /// Finger drive targets
    pub fn finger_targets(&self) -> &[f64; GRIPPER_DOF] {
        &self.finger_targets
    }

    /// Advance finger joints towards their targets over `dt` seconds
    ///
    /// `min_position` stops closing fingers, e.g. on the faces of a held box.
    pub fn step_fingers(&mut self, dt: f64, min_position: f64) {
        let max_delta = self.config.finger_speed * dt;
        for finger in 0..GRIPPER_DOF {
            let current = self.qpos[ARM_DOF + finger];
            let target = self.finger_targets[finger].max(min_position);
            self.qpos[ARM_DOF + finger] = utils::approach(current, target, max_delta);
        }
    }

    /// Whether the fingers have reached their drive targets
    pub fn fingers_settled(&self, min_position: f64) -> bool {
        self.finger_qpos()
            .iter()
            .zip(self.finger_targets.iter())
            .all(|(q, target)| (q - target.max(min_position)).abs() < 1e-9)
    }

    /// Current hand pose
    pub fn hand_pose(&self) -> Pose {
        self.hand_pose
    }

    pub(crate) fn set_hand_pose(&mut self, pose: Pose) {
        self.hand_pose = pose;
    }

    /// Fingertip point frame
    pub fn tcp_pose(&self) -> Pose {
        self.tcp_pose_for(&self.hand_pose)
    }

    /// Fingertip frame that a given hand pose would produce
    pub fn tcp_pose_for(&self, hand: &Pose) -> Pose {
        Pose::new(hand.transform_point(Vec3::new(0.0, 0.0, self.config.tcp_offset)), hand.rotation)
    }

    /// Shoulder joint position in world space
    pub fn shoulder(&self) -> Vec3 {
        let [x, y, z] = self.config.base;
        Vec3::new(x, y, z + self.config.shoulder_height)
    }

    /// Currently held actor, if any
    pub fn grasp(&self) -> Option<&Grasp> {
        self.grasp.as_ref()
    }

    pub(crate) fn attach(&mut self, actor: ActorId, actor_pose: &Pose) {
        let offset = self.tcp_pose().to_isometry().inverse() * actor_pose.to_isometry();
        self.grasp = Some(Grasp { actor, offset });
    }

    pub(crate) fn detach(&mut self) -> Option<Grasp> {
        self.grasp.take()
    }

    /// World pose of the held actor implied by the current fingertip frame
    pub fn held_pose(&self) -> Option<(ActorId, Pose)> {
        self.grasp.map(|grasp| {
            let world = self.tcp_pose().to_isometry() * grasp.offset;
            (grasp.actor, Pose::from_isometry(&world))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_qpos_requires_nine_values() {
        let mut robot = Robot::new(RobotConfig::default());
        let result = robot.set_qpos(&[0.0; 7]);

        assert_eq!(result, Err(SceneError::JointCount { expected: 9, got: 7 }));
        robot.set_qpos(&[0.0, 0.19, 0.0, -2.62, 0.0, 2.94, 0.79, 0.0, 0.0]).unwrap();
        assert_relative_eq!(robot.arm_qpos()[3], -2.62);
        assert_relative_eq!(robot.finger_gap(), 0.0);
    }

    #[test]
    fn test_set_qpos_rejects_nan() {
        let mut robot = Robot::new(RobotConfig::default());
        let mut qpos = [0.0; ROBOT_DOF];
        qpos[2] = f64::NAN;

        assert_eq!(robot.set_qpos(&qpos), Err(SceneError::NonFiniteJoint(2)));
    }

    #[test]
    fn test_finger_targets_are_clamped() {
        let mut robot = Robot::new(RobotConfig::default());
        // Requests beyond the joint limit saturate at fully open
        robot.set_finger_targets(0.4);
        assert_eq!(robot.finger_targets(), &[FINGER_OPEN; GRIPPER_DOF]);
    }

    #[test]
    fn test_fingers_move_at_limited_speed() {
        let mut robot = Robot::new(RobotConfig::default());
        robot.set_finger_targets(FINGER_OPEN);

        robot.step_fingers(0.1, FINGER_CLOSED);
        assert_relative_eq!(robot.finger_qpos()[0], 0.01, epsilon = 1e-12);
        assert!(!robot.fingers_settled(FINGER_CLOSED));

        for _ in 0..10 {
            robot.step_fingers(0.1, FINGER_CLOSED);
        }
        assert!(robot.fingers_settled(FINGER_CLOSED));
        assert_relative_eq!(robot.finger_gap(), 0.08, epsilon = 1e-12);
    }

    #[test]
    fn test_tcp_is_below_hand_when_pointing_down() {
        let robot = Robot::new(RobotConfig::default());
        let hand = robot.hand_pose();
        let tcp = robot.tcp_pose();

        assert_relative_eq!(tcp.position.z, hand.position.z - 0.1034, epsilon = 1e-12);
        assert_relative_eq!(tcp.position.x, hand.position.x, epsilon = 1e-12);
    }

    #[test]
    fn test_held_actor_follows_hand() {
        let mut robot = Robot::new(RobotConfig::default());
        let actor = ActorId::default();
        let box_pose = Pose::from_position(robot.tcp_pose().position - Vec3::new(0.0, 0.0, 0.03));

        robot.attach(actor, &box_pose);
        let hand = robot.hand_pose().translated(Vec3::new(0.1, 0.0, 0.05));
        robot.set_hand_pose(hand);

        let (held, pose) = robot.held_pose().unwrap();
        assert_eq!(held, actor);
        assert_relative_eq!(pose.position, box_pose.position + Vec3::new(0.1, 0.0, 0.05), epsilon = 1e-12);
        assert_relative_eq!(pose.rotation, box_pose.rotation, epsilon = 1e-12);
    }
}
