//! Demo configuration: engine settings, scene layout and choreography offsets

use serde::{Deserialize, Serialize};

use super::choreography::ChoreographyOffsets;
use crate::config::{Config, ConfigError};
use crate::foundation::math::{Color, Pose, PoseVec};
use crate::scene::ROBOT_DOF;
use crate::EngineConfig;

/// A movable box placed on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxProp {
    /// Unique actor name
    pub name: String,
    /// Half extents along x, y, z
    pub half_size: [f64; 3],
    /// Visual color
    pub color: Color,
    /// Initial center position
    pub position: [f64; 3],
}

impl BoxProp {
    /// Convenience constructor
    pub fn new(name: &str, half_size: [f64; 3], color: Color, position: [f64; 3]) -> Self {
        Self {
            name: name.to_string(),
            half_size,
            color,
            position,
        }
    }
}

/// The kinematic table the boxes rest on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    /// Actor name
    pub name: String,
    /// Half extents along x, y, z
    pub half_size: [f64; 3],
    /// Visual color
    pub color: Color,
    /// Center position
    pub position: [f64; 3],
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            name: "table".to_string(),
            half_size: [0.4, 0.4, 0.025],
            color: [0.8, 0.6, 0.4],
            position: [0.56, 0.0, -0.025],
        }
    }
}

/// Initial world contents and the pick targets
///
/// `targets[i]` is the hand pose used to pick `boxes[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    /// Initial joint vector: seven arm joints then two finger joints
    pub init_qpos: Vec<f64>,

    /// Pick target per box, `[x, y, z, qw, qx, qy, qz]`
    pub targets: Vec<PoseVec>,

    /// The table
    pub table: TableSpec,

    /// Boxes, in pick order
    pub boxes: Vec<BoxProp>,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            init_qpos: vec![0.0, 0.19, 0.0, -2.62, 0.0, 2.94, 0.79, 0.0, 0.0],
            targets: vec![
                [0.4, 0.3, 0.12, 0.0, 1.0, 0.0, 0.0],
                [0.2, -0.3, 0.08, 0.0, 1.0, 0.0, 0.0],
                [0.6, 0.1, 0.14, 0.0, 1.0, 0.0, 0.0],
            ],
            table: TableSpec::default(),
            boxes: vec![
                BoxProp::new("red_cube", [0.02, 0.02, 0.06], [1.0, 0.0, 0.0], [0.4, 0.3, 0.06]),
                BoxProp::new("green_cube", [0.02, 0.02, 0.04], [0.0, 1.0, 0.0], [0.2, -0.3, 0.04]),
                BoxProp::new("blue_cube", [0.02, 0.02, 0.07], [0.0, 0.0, 1.0], [0.6, 0.1, 0.07]),
            ],
        }
    }
}

/// Everything the demo binary needs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Scene, robot, planner and executor settings
    pub engine: EngineConfig,

    /// Table, boxes and targets
    pub layout: SceneLayout,

    /// Script offsets
    pub offsets: ChoreographyOffsets,
}

impl Config for DemoConfig {}

impl DemoConfig {
    /// Check that the layout describes a runnable demo
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;

        if layout.targets.len() != layout.boxes.len() {
            return Err(ConfigError::Invalid(format!(
                "{} targets for {} boxes",
                layout.targets.len(),
                layout.boxes.len()
            )));
        }
        for (index, target) in layout.targets.iter().enumerate() {
            Pose::from_pose_vec(target)
                .map_err(|err| ConfigError::Invalid(format!("target {index}: {err}")))?;
        }
        if layout.init_qpos.len() != ROBOT_DOF {
            return Err(ConfigError::Invalid(format!(
                "init_qpos has {} values, expected {}",
                layout.init_qpos.len(),
                ROBOT_DOF
            )));
        }

        let offsets = [
            self.offsets.approach_height,
            self.offsets.grasp_depth,
            self.offsets.place_shift,
        ];
        if offsets.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::Invalid("choreography offsets must be finite".to_string()));
        }

        Ok(())
    }
}
