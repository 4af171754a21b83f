//! Common types shared by the limits, kinematics and trajectory modules

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// Tool frame pose: translation plus unit quaternion orientation.
///
/// The quaternion inside an `Isometry3` is always unit norm.
pub type Pose = Isometry3<f64>;

/// Build a pose from a position and roll/pitch/yaw angles.
pub fn pose_from_xyz_rpy(position: Vector3<f64>, roll: f64, pitch: f64, yaw: f64) -> Pose {
    Pose::from_parts(
        Translation3::from(position),
        UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    )
}

/// Joint state as delivered by the caller.
///
/// Parallel arrays indexed like `names`. `velocities` and `accelerations`
/// may be empty (or shorter than `names`) when they are not known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointState {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
}

impl JointState {
    /// Create a joint state at rest from names and positions
    pub fn from_positions<S: AsRef<str>>(names: &[S], positions: &[f64]) -> Self {
        JointState {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            positions: positions.to_vec(),
            velocities: Vec::new(),
            accelerations: Vec::new(),
        }
    }

    /// Position of the named joint, if present
    pub fn position(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.positions.get(i).copied())
    }

    /// Positions reordered to follow `order`.
    ///
    /// Returns the first joint in `order` that has no position.
    pub fn ordered_positions(&self, order: &[String]) -> Result<Vec<f64>, String> {
        order
            .iter()
            .map(|name| self.position(name).ok_or_else(|| name.clone()))
            .collect()
    }
}
