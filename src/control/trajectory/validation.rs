//! Structural checks on a circular motion request
//!
//! Everything that can be decided without fitting a circle is checked here,
//! in a fixed order: start state, scaling, auxiliary point, link names and
//! finally the goal. The first failing check wins.

use std::collections::HashSet;

use nalgebra::Vector3;

use super::request::{
    AuxiliaryConstraint, AuxiliaryKind, GoalSpec, JointConstraint, PoseGoal, TrajectoryRequest,
};
use crate::common::Pose;
use crate::error::GenerationError;
use crate::kinematics::Kinematics;
use crate::limits::LimitsContainer;

/// Goal in the form the generator consumes
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedGoal {
    /// Goal joint positions ordered like the active joints
    Joints(Vec<f64>),
    /// Cartesian goal with the tolerances the final waypoint must meet
    Pose(PoseGoal),
}

/// A request that passed every structural check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Start positions ordered like the active joints
    pub start_positions: Vec<f64>,
    /// Link whose frame follows the arc
    pub link_name: String,
    pub auxiliary_kind: AuxiliaryKind,
    pub auxiliary_position: Vector3<f64>,
    pub goal: ValidatedGoal,
}

pub struct RequestValidator<'a> {
    kinematics: &'a dyn Kinematics,
    limits: &'a LimitsContainer,
    start_velocity_tolerance: f64,
}

impl<'a> RequestValidator<'a> {
    pub fn new(
        kinematics: &'a dyn Kinematics,
        limits: &'a LimitsContainer,
        start_velocity_tolerance: f64,
    ) -> Self {
        RequestValidator {
            kinematics,
            limits,
            start_velocity_tolerance,
        }
    }

    pub fn validate(
        &self,
        request: &TrajectoryRequest,
    ) -> Result<ValidatedRequest, GenerationError> {
        let start_positions = self.check_start_state(request)?;
        check_scaling("velocity", request.velocity_scale)?;
        check_scaling("acceleration", request.acceleration_scale)?;

        let (auxiliary, auxiliary_kind, auxiliary_pose) =
            check_auxiliary(request.auxiliary.as_ref())?;
        let link_name = self.check_link(auxiliary, &request.goal)?;

        let goal = match &request.goal {
            GoalSpec::Joint(constraints) => {
                ValidatedGoal::Joints(self.check_joint_goal(constraints)?)
            }
            GoalSpec::Pose(goal) => ValidatedGoal::Pose(goal.clone()),
        };

        Ok(ValidatedRequest {
            start_positions,
            link_name,
            auxiliary_kind,
            auxiliary_position: auxiliary_pose.translation.vector,
            goal,
        })
    }

    fn check_start_state(&self, request: &TrajectoryRequest) -> Result<Vec<f64>, GenerationError> {
        let state = &request.start_state;
        for (name, velocity) in state.names.iter().zip(&state.velocities) {
            if velocity.is_nan() || velocity.abs() > self.start_velocity_tolerance {
                return Err(GenerationError::InvalidRobotState(format!(
                    "joint '{name}' is moving ({velocity}), circular motions must start at rest"
                )));
            }
        }

        let active = self.kinematics.active_joint_names();
        let positions = state.ordered_positions(active).map_err(|joint| {
            GenerationError::InvalidRobotState(format!(
                "start state has no position for joint '{joint}'"
            ))
        })?;

        for (joint, &position) in active.iter().zip(&positions) {
            if !self.within_limits(joint, position) {
                return Err(GenerationError::InvalidRobotState(format!(
                    "start position {position} of joint '{joint}' violates its position limits"
                )));
            }
        }
        Ok(positions)
    }

    /// Resolve the tracked link, checking it against the goal and the model
    fn check_link(
        &self,
        auxiliary: &AuxiliaryConstraint,
        goal: &GoalSpec,
    ) -> Result<String, GenerationError> {
        if let GoalSpec::Pose(pose_goal) = goal {
            if pose_goal.link_name != auxiliary.link_name {
                return Err(GenerationError::InvalidLinkName(format!(
                    "auxiliary point refers to '{}' but the goal targets '{}'",
                    auxiliary.link_name, pose_goal.link_name
                )));
            }
        }
        if !self.kinematics.has_link(&auxiliary.link_name) {
            return Err(GenerationError::InvalidLinkName(format!(
                "link '{}' is unknown to the kinematic model",
                auxiliary.link_name
            )));
        }
        Ok(auxiliary.link_name.clone())
    }

    fn check_joint_goal(
        &self,
        constraints: &[JointConstraint],
    ) -> Result<Vec<f64>, GenerationError> {
        let active = self.kinematics.active_joint_names();

        let mut seen = HashSet::new();
        for constraint in constraints {
            if !seen.insert(constraint.joint_name.as_str()) {
                return Err(GenerationError::InvalidGoalConstraints(format!(
                    "joint '{}' is constrained twice",
                    constraint.joint_name
                )));
            }
            if !active.contains(&constraint.joint_name) {
                return Err(GenerationError::InvalidGoalConstraints(format!(
                    "joint '{}' is not an active joint",
                    constraint.joint_name
                )));
            }
            if !self.within_limits(&constraint.joint_name, constraint.position) {
                return Err(GenerationError::InvalidGoalConstraints(format!(
                    "goal position {} of joint '{}' violates its position limits",
                    constraint.position, constraint.joint_name
                )));
            }
        }

        active
            .iter()
            .map(|joint| {
                constraints
                    .iter()
                    .find(|c| &c.joint_name == joint)
                    .map(|c| c.position)
                    .ok_or_else(|| {
                        GenerationError::InvalidGoalConstraints(format!(
                            "no goal position for joint '{joint}'"
                        ))
                    })
            })
            .collect()
    }

    fn within_limits(&self, joint: &str, position: f64) -> bool {
        self.limits
            .joint_limit(joint)
            .map_or(true, |limit| limit.satisfies_position(position))
    }
}

fn check_scaling(kind: &str, factor: f64) -> Result<(), GenerationError> {
    if factor > 0.0 && factor <= 1.0 {
        Ok(())
    } else {
        Err(GenerationError::InvalidMotionPlan(format!(
            "{kind} scaling factor {factor} is outside (0, 1]"
        )))
    }
}

fn check_auxiliary(
    auxiliary: Option<&AuxiliaryConstraint>,
) -> Result<(&AuxiliaryConstraint, AuxiliaryKind, &Pose), GenerationError> {
    let auxiliary = auxiliary.ok_or_else(|| {
        GenerationError::InvalidMotionPlan(
            "circular motion needs a center or interim point".to_string(),
        )
    })?;

    if auxiliary.name.is_empty() {
        return Err(GenerationError::InvalidMotionPlan(
            "auxiliary point has no name, expected 'center' or 'interim'".to_string(),
        ));
    }
    let kind = AuxiliaryKind::from_name(&auxiliary.name).ok_or_else(|| {
        GenerationError::InvalidMotionPlan(format!(
            "unknown auxiliary point '{}', expected 'center' or 'interim'",
            auxiliary.name
        ))
    })?;

    match auxiliary.poses.as_slice() {
        [pose] => Ok((auxiliary, kind, pose)),
        poses => Err(GenerationError::InvalidMotionPlan(format!(
            "{kind} point must carry exactly one pose, got {}",
            poses.len()
        ))),
    }
}
