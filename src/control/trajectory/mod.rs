//! Trajectory generation module
//!
//! Generators share one request/response contract through the
//! [`TrajectoryGenerator`] trait. [`CircTrajectoryGenerator`] is the
//! circular arc implementation.

pub mod arc;
pub mod circ;
pub mod joint_trajectory;
pub mod profile;
pub mod request;
pub mod validation;

use std::time::Duration;

pub use self::arc::{ArcPath, CircleArc};
pub use self::circ::{CircConfig, CircTrajectoryGenerator};
pub use self::joint_trajectory::{JointTrajectory, JointTrajectoryPoint};
pub use self::request::{
    AuxiliaryConstraint, AuxiliaryKind, GoalSpec, JointConstraint, PoseGoal, TrajectoryRequest,
};

use crate::error::{ErrorCode, GenerationError};

/// Capability shared by all trajectory generators
pub trait TrajectoryGenerator: Send + Sync {
    /// Short name of the motion type
    fn name(&self) -> &str;

    /// Plan a request. Failures are reported in the result, never raised.
    fn generate(&self, request: &TrajectoryRequest) -> GenerationResult;
}

/// Outcome of one `generate` call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub error_code: ErrorCode,
    /// Present exactly when `error_code` is `Success`
    pub trajectory: Option<JointTrajectory>,
    pub message: String,
    pub planning_time: Duration,
}

impl GenerationResult {
    pub fn from_trajectory(trajectory: JointTrajectory, planning_time: Duration) -> Self {
        GenerationResult {
            error_code: ErrorCode::Success,
            trajectory: Some(trajectory),
            message: String::new(),
            planning_time,
        }
    }

    pub fn from_error(error: &GenerationError, planning_time: Duration) -> Self {
        GenerationResult {
            error_code: error.code(),
            trajectory: None,
            message: error.to_string(),
            planning_time,
        }
    }

    pub fn success(&self) -> bool {
        self.error_code.is_success()
    }
}
