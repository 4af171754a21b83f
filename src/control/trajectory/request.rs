//! Motion request types shared by the trajectory generators

use std::fmt;

use crate::common::{JointState, Pose};

/// Tag of the auxiliary point of a circular motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryKind {
    /// The point is the circle center
    Center,
    /// The point lies on the arc between start and goal
    Interim,
}

impl AuxiliaryKind {
    pub const CENTER: &'static str = "center";
    pub const INTERIM: &'static str = "interim";

    /// Parse a constraint name, `None` for anything but `center`/`interim`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::CENTER => Some(AuxiliaryKind::Center),
            Self::INTERIM => Some(AuxiliaryKind::Interim),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AuxiliaryKind::Center => Self::CENTER,
            AuxiliaryKind::Interim => Self::INTERIM,
        }
    }
}

impl fmt::Display for AuxiliaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path constraint carrying the auxiliary point.
///
/// Kept as loose as it arrives from the transport: the tag is a free string
/// and any number of poses may be attached. The validator narrows it down
/// to exactly one tagged pose.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryConstraint {
    pub name: String,
    pub link_name: String,
    pub poses: Vec<Pose>,
}

impl AuxiliaryConstraint {
    pub fn new(kind: AuxiliaryKind, link_name: &str, pose: Pose) -> Self {
        AuxiliaryConstraint {
            name: kind.name().to_string(),
            link_name: link_name.to_string(),
            poses: vec![pose],
        }
    }
}

/// Target position of one joint
#[derive(Debug, Clone, PartialEq)]
pub struct JointConstraint {
    pub joint_name: String,
    pub position: f64,
}

/// Cartesian goal for a link
#[derive(Debug, Clone, PartialEq)]
pub struct PoseGoal {
    pub link_name: String,
    pub pose: Pose,
    pub position_tolerance: f64,
    pub orientation_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GoalSpec {
    Joint(Vec<JointConstraint>),
    Pose(PoseGoal),
}

impl GoalSpec {
    /// Joint goal from parallel name/position slices
    pub fn joints<S: AsRef<str>>(names: &[S], positions: &[f64]) -> Self {
        GoalSpec::Joint(
            names
                .iter()
                .zip(positions)
                .map(|(name, &position)| JointConstraint {
                    joint_name: name.as_ref().to_string(),
                    position,
                })
                .collect(),
        )
    }

    pub fn pose(link_name: &str, pose: Pose) -> Self {
        GoalSpec::Pose(PoseGoal {
            link_name: link_name.to_string(),
            pose,
            position_tolerance: 1e-3,
            orientation_tolerance: 1e-3,
        })
    }
}

/// A motion planning request.
///
/// Scaling factors are fractions of the configured limits and must lie in
/// `(0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryRequest {
    pub start_state: JointState,
    pub goal: GoalSpec,
    pub auxiliary: Option<AuxiliaryConstraint>,
    pub velocity_scale: f64,
    pub acceleration_scale: f64,
}

impl TrajectoryRequest {
    pub fn new(start_state: JointState, goal: GoalSpec) -> Self {
        TrajectoryRequest {
            start_state,
            goal,
            auxiliary: None,
            velocity_scale: 0.1,
            acceleration_scale: 0.1,
        }
    }

    pub fn with_auxiliary(mut self, auxiliary: AuxiliaryConstraint) -> Self {
        self.auxiliary = Some(auxiliary);
        self
    }

    pub fn with_scaling(mut self, velocity_scale: f64, acceleration_scale: f64) -> Self {
        self.velocity_scale = velocity_scale;
        self.acceleration_scale = acceleration_scale;
        self
    }
}
