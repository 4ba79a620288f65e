//! Pick-and-place choreography
//!
//! The script for one box is a straight-line list of actions computed from
//! the box's target pose. The pose vector is mutated in place between moves;
//! only the x (index 0) and z (index 2) entries ever change.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Pose, PoseError, PoseVec};

/// Vertical and horizontal offsets applied by the script
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyOffsets {
    /// Height above the target used for the pre-grasp approach
    pub approach_height: f64,

    /// Distance lowered from the approach height to grasp (and raised back)
    pub grasp_depth: f64,

    /// Horizontal shift along x between pick and drop
    pub place_shift: f64,
}

impl Default for ChoreographyOffsets {
    fn default() -> Self {
        Self {
            approach_height: 0.2,
            grasp_depth: 0.12,
            place_shift: 0.1,
        }
    }
}

/// A single arm or gripper command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move the hand to a pose
    MoveTo(Pose),
    /// Open the gripper
    OpenGripper,
    /// Close the gripper
    CloseGripper,
}

impl Action {
    /// Whether this is a gripper command
    pub fn is_gripper(&self) -> bool {
        matches!(self, Self::OpenGripper | Self::CloseGripper)
    }
}

/// An action tagged with the script step (1 through 7) it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedAction {
    /// Step number within the per-box script
    pub step: u8,
    /// The command
    pub action: Action,
}

/// Build the seven-step pick-and-place script for one target pose
///
/// 1. raise by `approach_height` and move
/// 2. open the gripper
/// 3. lower by `grasp_depth` and move
/// 4. close the gripper
/// 5. raise by `grasp_depth` and move
/// 6. shift x by `place_shift` and move
/// 7. lower and move, open the gripper, raise and move
pub fn pick_and_place(target: &PoseVec, offsets: &ChoreographyOffsets) -> Result<Vec<ScriptedAction>, PoseError> {
    let mut pose = *target;
    let mut script = Vec::with_capacity(10);
    let move_to = |step: u8, pose: &PoseVec, script: &mut Vec<ScriptedAction>| -> Result<(), PoseError> {
        script.push(ScriptedAction {
            step,
            action: Action::MoveTo(Pose::from_pose_vec(pose)?),
        });
        Ok(())
    };
    let gripper = |step: u8, action: Action| ScriptedAction { step, action };

    pose[2] += offsets.approach_height;
    move_to(1, &pose, &mut script)?;
    script.push(gripper(2, Action::OpenGripper));

    pose[2] -= offsets.grasp_depth;
    move_to(3, &pose, &mut script)?;
    script.push(gripper(4, Action::CloseGripper));

    pose[2] += offsets.grasp_depth;
    move_to(5, &pose, &mut script)?;

    pose[0] += offsets.place_shift;
    move_to(6, &pose, &mut script)?;

    pose[2] -= offsets.grasp_depth;
    move_to(7, &pose, &mut script)?;
    script.push(gripper(7, Action::OpenGripper));
    pose[2] += offsets.grasp_depth;
    move_to(7, &pose, &mut script)?;

    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RED: PoseVec = [0.4, 0.3, 0.12, 0.0, 1.0, 0.0, 0.0];

    fn script(target: &PoseVec) -> Vec<ScriptedAction> {
        pick_and_place(target, &ChoreographyOffsets::default()).unwrap()
    }

    fn last_move_of_step(script: &[ScriptedAction], step: u8) -> PoseVec {
        script
            .iter()
            .filter(|scripted| scripted.step == step)
            .filter_map(|scripted| match scripted.action {
                Action::MoveTo(pose) => Some(pose.to_pose_vec()),
                _ => None,
            })
            .last()
            .unwrap()
    }

    fn assert_pose_vec(actual: PoseVec, expected: PoseVec) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_red_cube_waypoints() {
        let script = script(&RED);

        assert_pose_vec(last_move_of_step(&script, 1), [0.4, 0.3, 0.32, 0.0, 1.0, 0.0, 0.0]);
        assert_pose_vec(last_move_of_step(&script, 3), [0.4, 0.3, 0.20, 0.0, 1.0, 0.0, 0.0]);
        assert_pose_vec(last_move_of_step(&script, 5), [0.4, 0.3, 0.32, 0.0, 1.0, 0.0, 0.0]);
        assert_pose_vec(last_move_of_step(&script, 6), [0.5, 0.3, 0.32, 0.0, 1.0, 0.0, 0.0]);
        assert_pose_vec(last_move_of_step(&script, 7), [0.5, 0.3, 0.32, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_net_displacement_for_every_target() {
        let targets = [
            RED,
            [0.2, -0.3, 0.08, 0.0, 1.0, 0.0, 0.0],
            [0.6, 0.1, 0.14, 0.0, 1.0, 0.0, 0.0],
        ];

        for target in &targets {
            let last = last_move_of_step(&script(target), 7);
            assert_relative_eq!(last[0] - target[0], 0.1, epsilon = 1e-12);
            assert_relative_eq!(last[1], target[1], epsilon = 1e-12);
            assert_relative_eq!(last[2] - target[2], 0.2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_orientation_never_changes() {
        for scripted in script(&RED) {
            if let Action::MoveTo(pose) = scripted.action {
                assert_pose_vec(
                    pose.to_pose_vec(),
                    [pose.position.x, pose.position.y, pose.position.z, 0.0, 1.0, 0.0, 0.0],
                );
                assert_relative_eq!(pose.position.y, 0.3, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_gripper_sequence_is_open_close_open() {
        let gripper: Vec<Action> = script(&RED)
            .into_iter()
            .map(|scripted| scripted.action)
            .filter(Action::is_gripper)
            .collect();

        assert_eq!(gripper, vec![Action::OpenGripper, Action::CloseGripper, Action::OpenGripper]);
    }

    #[test]
    fn test_script_shape() {
        let script = script(&RED);
        let steps: Vec<u8> = script.iter().map(|scripted| scripted.step).collect();

        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6, 7, 7, 7]);
        assert_eq!(script.iter().filter(|s| !s.action.is_gripper()).count(), 6);
    }

    #[test]
    fn test_degenerate_target_rejected() {
        let result = pick_and_place(&[0.4, 0.3, 0.12, 0.0, 0.0, 0.0, 0.0], &ChoreographyOffsets::default());
        assert!(matches!(result, Err(PoseError::DegenerateQuaternion(..))));
    }
}
