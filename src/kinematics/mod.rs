//! Kinematics collaborator interface
//!
//! The trajectory generators never compute kinematics themselves. They ask
//! an implementation of [`Kinematics`] for forward/inverse solutions and the
//! geometric Jacobian of a link. Joint values are always ordered like
//! [`Kinematics::active_joint_names`].

pub mod gantry;

use nalgebra::DMatrix;

use crate::common::Pose;
use crate::error::KinematicsError;

pub use self::gantry::GantryKinematics;

/// Forward/inverse kinematics of a manipulator
pub trait Kinematics: Send + Sync {
    /// Names of the actuated joints, in the order joint vectors use
    fn active_joint_names(&self) -> &[String];

    /// Whether `link` is a frame this model can solve for
    fn has_link(&self, link: &str) -> bool;

    /// Pose of `link` in the model frame
    fn forward(&self, positions: &[f64], link: &str) -> Result<Pose, KinematicsError>;

    /// Joint positions placing `link` at `pose`, preferring the solution
    /// closest to `seed`
    fn inverse(&self, pose: &Pose, link: &str, seed: &[f64]) -> Result<Vec<f64>, KinematicsError>;

    /// 6×n geometric Jacobian of `link`: rows 0..3 map joint velocity to
    /// linear velocity, rows 3..6 to angular velocity, both in the model frame
    fn jacobian(&self, positions: &[f64], link: &str) -> Result<DMatrix<f64>, KinematicsError>;

    fn dof(&self) -> usize {
        self.active_joint_names().len()
    }
}
