//! Error types for motion planning

use thiserror::Error;

/// Errors raised while building limits or constructing a generator.
///
/// These are fatal for the generator instance: a generator is never
/// handed out when construction fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no cartesian limits configured")]
    MissingCartesianLimits,

    #[error("no joint limits configured for active joint '{joint}'")]
    MissingJointLimit { joint: String },

    #[error("limit '{name}' must be strictly positive, got {value}")]
    NonPositiveLimit { name: String, value: f64 },

    #[error("position limits of joint '{joint}' are inverted: min {min} > max {max}")]
    InvalidPositionLimits { joint: String, min: f64, max: f64 },

    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: String, value: String },
}

/// Failures reported by a kinematics collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    #[error("unknown link '{0}'")]
    UnknownLink(String),

    #[error("pose is unreachable: {0}")]
    Unreachable(String),

    #[error("expected {expected} joint values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("configuration is singular: {0}")]
    Singular(String),
}

/// Externally visible result code of a generation call.
///
/// `value()` yields the integer used on the wire by the planning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    PlanningFailed,
    InvalidMotionPlan,
    InvalidRobotState,
    InvalidGoalConstraints,
    InvalidLinkName,
}

impl ErrorCode {
    pub fn value(self) -> i32 {
        match self {
            ErrorCode::Success => 1,
            ErrorCode::PlanningFailed => -1,
            ErrorCode::InvalidMotionPlan => -2,
            ErrorCode::InvalidGoalConstraints => -16,
            ErrorCode::InvalidRobotState => -17,
            ErrorCode::InvalidLinkName => -18,
        }
    }

    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

/// Per-request failure of a trajectory generator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("invalid robot state: {0}")]
    InvalidRobotState(String),

    #[error("invalid goal constraints: {0}")]
    InvalidGoalConstraints(String),

    #[error("invalid link name: {0}")]
    InvalidLinkName(String),

    #[error("invalid motion plan: {0}")]
    InvalidMotionPlan(String),

    #[error("planning failed: {0}")]
    PlanningFailed(String),
}

impl GenerationError {
    /// Result code this failure maps onto
    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::InvalidRobotState(_) => ErrorCode::InvalidRobotState,
            GenerationError::InvalidGoalConstraints(_) => ErrorCode::InvalidGoalConstraints,
            GenerationError::InvalidLinkName(_) => ErrorCode::InvalidLinkName,
            GenerationError::InvalidMotionPlan(_) => ErrorCode::InvalidMotionPlan,
            GenerationError::PlanningFailed(_) => ErrorCode::PlanningFailed,
        }
    }
}

impl From<KinematicsError> for GenerationError {
    fn from(err: KinematicsError) -> Self {
        GenerationError::InvalidMotionPlan(err.to_string())
    }
}

/// Errors raised by lifecycle-managed components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("configuration failed: {0}")]
    Configuration(#[from] ConfigError),

    #[error("component '{name}' is not active")]
    NotActive { name: String },

    #[error("invalid transition of '{name}' from {from} to {to}")]
    InvalidTransition {
        name: String,
        from: String,
        to: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_planning_service() {
        assert_eq!(ErrorCode::Success.value(), 1);
        assert_eq!(ErrorCode::PlanningFailed.value(), -1);
        assert_eq!(ErrorCode::InvalidMotionPlan.value(), -2);
        assert_eq!(ErrorCode::InvalidGoalConstraints.value(), -16);
        assert_eq!(ErrorCode::InvalidRobotState.value(), -17);
        assert_eq!(ErrorCode::InvalidLinkName.value(), -18);
    }

    #[test]
    fn kinematics_failure_is_invalid_motion_plan() {
        let err: GenerationError = KinematicsError::Unreachable("out of workspace".into()).into();
        assert_eq!(err.code(), ErrorCode::InvalidMotionPlan);
        assert!(err.to_string().contains("out of workspace"));
    }

    #[test]
    fn config_error_messages() {
        let err = ConfigError::MissingJointLimit {
            joint: "wrist_roll".into(),
        };
        assert!(err.to_string().contains("wrist_roll"));
        assert!(ConfigError::MissingCartesianLimits
            .to_string()
            .contains("cartesian"));
    }
}
