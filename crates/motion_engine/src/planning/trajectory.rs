//! Time-stamped hand-pose trajectories

use crate::foundation::math::Pose;

/// A single trajectory sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Time since the start of the trajectory in seconds
    pub time: f64,
    /// Hand pose at that time
    pub pose: Pose,
}

/// Ordered hand poses sampled at a fixed time step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    waypoints: Vec<Waypoint>,
    time_step: f64,
}

impl Trajectory {
    /// Create an empty trajectory with the given sampling step
    pub fn new(time_step: f64) -> Self {
        Self {
            waypoints: Vec::new(),
            time_step,
        }
    }

    /// Append a pose one time step after the last waypoint
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, pose: Pose) {
        let time = self.waypoints.len() as f64 * self.time_step;
        self.waypoints.push(Waypoint { time, pose });
    }

    /// Append a straight segment from the last waypoint to `goal`
    ///
    /// The segment gets `samples` waypoints, the last one exactly at `goal`.
    #[allow(clippy::cast_precision_loss)]
    pub fn extend_towards(&mut self, goal: &Pose, samples: usize) {
        let Some(start) = self.last().copied() else {
            self.push(*goal);
            return;
        };

        for i in 1..=samples {
            let t = i as f64 / samples as f64;
            self.push(start.interpolate(goal, t));
        }
    }

    /// All waypoints
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Hand poses in order
    pub fn poses(&self) -> impl Iterator<Item = &Pose> {
        self.waypoints.iter().map(|waypoint| &waypoint.pose)
    }

    /// First pose
    pub fn first(&self) -> Option<&Pose> {
        self.waypoints.first().map(|waypoint| &waypoint.pose)
    }

    /// Final pose
    pub fn last(&self) -> Option<&Pose> {
        self.waypoints.last().map(|waypoint| &waypoint.pose)
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the trajectory has no waypoints
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Time stamp of the last waypoint
    pub fn duration(&self) -> f64 {
        self.waypoints.last().map_or(0.0, |waypoint| waypoint.time)
    }
}
