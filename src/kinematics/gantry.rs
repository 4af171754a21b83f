//! Six-axis gantry with a yaw-pitch-roll wrist
//!
//! Three prismatic axes carry the wrist center along x, y and z. The wrist
//! rotates the tool by `Rz(yaw) * Ry(pitch) * Rx(roll)`. The tool frame sits
//! at the wrist center, so the kinematics decouple into translation and
//! orientation and both directions have closed forms.

use std::f64::consts::{PI, TAU};

use nalgebra::{DMatrix, Translation3, UnitQuaternion, Vector3};

use super::Kinematics;
use crate::common::Pose;
use crate::error::KinematicsError;

/// Default tool link name
pub const TOOL_LINK: &str = "tool0";

const JOINT_NAMES: [&str; 6] = [
    "axis_x",
    "axis_y",
    "axis_z",
    "wrist_yaw",
    "wrist_pitch",
    "wrist_roll",
];

// cos(pitch) below this is treated as gimbal lock
const SINGULARITY_EPS: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct GantryKinematics {
    joint_names: Vec<String>,
    tool_link: String,
}

impl Default for GantryKinematics {
    fn default() -> Self {
        Self::new()
    }
}

impl GantryKinematics {
    pub fn new() -> Self {
        GantryKinematics {
            joint_names: JOINT_NAMES.iter().map(|n| n.to_string()).collect(),
            tool_link: TOOL_LINK.to_string(),
        }
    }

    fn check_link(&self, link: &str) -> Result<(), KinematicsError> {
        if self.has_link(link) {
            Ok(())
        } else {
            Err(KinematicsError::UnknownLink(link.to_string()))
        }
    }

    fn check_dimension(&self, values: &[f64]) -> Result<(), KinematicsError> {
        if values.len() == self.joint_names.len() {
            Ok(())
        } else {
            Err(KinematicsError::DimensionMismatch {
                expected: self.joint_names.len(),
                actual: values.len(),
            })
        }
    }
}

impl Kinematics for GantryKinematics {
    fn active_joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn has_link(&self, link: &str) -> bool {
        link == self.tool_link
    }

    fn forward(&self, positions: &[f64], link: &str) -> Result<Pose, KinematicsError> {
        self.check_link(link)?;
        self.check_dimension(positions)?;

        let translation = Translation3::new(positions[0], positions[1], positions[2]);
        let rotation = UnitQuaternion::from_euler_angles(positions[5], positions[4], positions[3]);
        Ok(Pose::from_parts(translation, rotation))
    }

    fn inverse(&self, pose: &Pose, link: &str, seed: &[f64]) -> Result<Vec<f64>, KinematicsError> {
        self.check_link(link)?;
        self.check_dimension(seed)?;

        let (roll, pitch, yaw) = pose.rotation.euler_angles();
        if pitch.cos().abs() < SINGULARITY_EPS {
            return Err(KinematicsError::Singular(format!(
                "wrist pitch {pitch:.6} rad is at gimbal lock"
            )));
        }

        // Both wrist branches give the same orientation; keep the one that
        // stays closest to the seed.
        let branches = [
            [yaw, pitch, roll],
            [yaw + PI, PI - pitch, roll + PI],
        ];
        let wrist = branches
            .iter()
            .map(|b| {
                [
                    unwrap_towards(b[0], seed[3]),
                    unwrap_towards(b[1], seed[4]),
                    unwrap_towards(b[2], seed[5]),
                ]
            })
            .min_by(|a, b| {
                distance(a, &seed[3..]).total_cmp(&distance(b, &seed[3..]))
            })
            .ok_or_else(|| KinematicsError::Unreachable("no wrist solution".to_string()))?;

        let t = pose.translation.vector;
        Ok(vec![t.x, t.y, t.z, wrist[0], wrist[1], wrist[2]])
    }

    fn jacobian(&self, positions: &[f64], link: &str) -> Result<DMatrix<f64>, KinematicsError> {
        self.check_link(link)?;
        self.check_dimension(positions)?;

        let (yaw, pitch) = (positions[3], positions[4]);
        let yaw_axis = Vector3::z();
        let pitch_axis = Vector3::new(-yaw.sin(), yaw.cos(), 0.0);
        let roll_axis = Vector3::new(
            yaw.cos() * pitch.cos(),
            yaw.sin() * pitch.cos(),
            -pitch.sin(),
        );

        let mut jacobian = DMatrix::zeros(6, 6);
        for axis in 0..3 {
            jacobian[(axis, axis)] = 1.0;
        }
        for (column, wrist_axis) in [yaw_axis, pitch_axis, roll_axis].iter().enumerate() {
            for row in 0..3 {
                jacobian[(3 + row, 3 + column)] = wrist_axis[row];
            }
        }
        Ok(jacobian)
    }
}

fn unwrap_towards(angle: f64, reference: f64) -> f64 {
    angle + ((reference - angle) / TAU).round() * TAU
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverse_recovers_forward() {
        let kin = GantryKinematics::new();
        let q = [0.3, -0.2, 0.5, 0.4, -0.3, 0.2];
        let pose = kin.forward(&q, TOOL_LINK).unwrap();
        let solution = kin.inverse(&pose, TOOL_LINK, &[0.0; 6]).unwrap();
        for (a, b) in solution.iter().zip(q.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn inverse_unwraps_towards_seed() {
        let kin = GantryKinematics::new();
        let q = [0.0, 0.0, 0.0, 3.0, 0.1, 0.0];
        let pose = kin.forward(&q, TOOL_LINK).unwrap();
        let seed = [0.0, 0.0, 0.0, 3.0 + TAU, 0.1, 0.0];
        let solution = kin.inverse(&pose, TOOL_LINK, &seed).unwrap();
        assert_abs_diff_eq!(solution[3], 3.0 + TAU, epsilon = 1e-9);
    }

    #[test]
    fn gimbal_lock_is_singular() {
        let kin = GantryKinematics::new();
        let pose = kin
            .forward(&[0.0, 0.0, 0.0, 0.0, PI / 2.0, 0.0], TOOL_LINK)
            .unwrap();
        assert!(matches!(
            kin.inverse(&pose, TOOL_LINK, &[0.0; 6]),
            Err(KinematicsError::Singular(_))
        ));
    }

    #[test]
    fn unknown_link_and_bad_dimension() {
        let kin = GantryKinematics::new();
        assert!(matches!(
            kin.forward(&[0.0; 6], "flange"),
            Err(KinematicsError::UnknownLink(_))
        ));
        assert!(matches!(
            kin.jacobian(&[0.0; 5], TOOL_LINK),
            Err(KinematicsError::DimensionMismatch { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let kin = GantryKinematics::new();
        let q = [0.1, 0.2, 0.3, 0.7, -0.4, 0.9];
        let jacobian = kin.jacobian(&q, TOOL_LINK).unwrap();
        let h = 1e-7;
        let base = kin.forward(&q, TOOL_LINK).unwrap();

        for joint in 0..6 {
            let mut shifted = q;
            shifted[joint] += h;
            let pose = kin.forward(&shifted, TOOL_LINK).unwrap();
            let linear = (pose.translation.vector - base.translation.vector) / h;
            let angular = (pose.rotation * base.rotation.inverse()).scaled_axis() / h;
            for row in 0..3 {
                assert_abs_diff_eq!(jacobian[(row, joint)], linear[row], epsilon = 1e-5);
                assert_abs_diff_eq!(jacobian[(row + 3, joint)], angular[row], epsilon = 1e-5);
            }
        }
    }
}
