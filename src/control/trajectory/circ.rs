//! Circular motion generator
//!
//! Runs one request through validation, arc resolution, time
//! parameterization and joint space sampling. Any stage may end the call
//! with a [`GenerationError`]; nothing is kept between calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::arc::{ArcPath, CircleArc};
use super::joint_trajectory::{JointTrajectory, JointTrajectoryBuilder};
use super::profile::PathTimeLaw;
use super::request::{PoseGoal, TrajectoryRequest};
use super::validation::{RequestValidator, ValidatedGoal};
use super::{GenerationResult, TrajectoryGenerator};
use crate::error::{ConfigError, GenerationError};
use crate::kinematics::Kinematics;
use crate::limits::{CartesianLimit, LimitsContainer};

const PARAM_PREFIX: &str = "circ/";

/// Tuning of the circular generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircConfig {
    /// Time between two waypoints in seconds
    pub sampling_time: f64,
    /// Largest start joint speed still treated as rest
    pub start_velocity_tolerance: f64,
    /// Distance below which defining points count as coincident or collinear
    pub colinearity_epsilon: f64,
    /// Allowed difference between start and goal radius for a center point
    pub radius_tolerance: f64,
}

impl Default for CircConfig {
    fn default() -> Self {
        CircConfig {
            sampling_time: 0.1,
            start_velocity_tolerance: 1e-8,
            colinearity_epsilon: 1e-8,
            radius_tolerance: 1e-4,
        }
    }
}

impl CircConfig {
    /// Read `circ/<field>` keys, falling back to the defaults
    pub fn from_params(params: &HashMap<String, f64>) -> Result<Self, ConfigError> {
        let defaults = CircConfig::default();
        let get = |field: &str, default: f64| {
            params
                .get(&format!("{PARAM_PREFIX}{field}"))
                .copied()
                .unwrap_or(default)
        };
        let config = CircConfig {
            sampling_time: get("sampling_time", defaults.sampling_time),
            start_velocity_tolerance: get(
                "start_velocity_tolerance",
                defaults.start_velocity_tolerance,
            ),
            colinearity_epsilon: get("colinearity_epsilon", defaults.colinearity_epsilon),
            radius_tolerance: get("radius_tolerance", defaults.radius_tolerance),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("sampling_time", self.sampling_time),
            ("start_velocity_tolerance", self.start_velocity_tolerance),
            ("colinearity_epsilon", self.colinearity_epsilon),
            ("radius_tolerance", self.radius_tolerance),
        ];
        for (name, value) in fields {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name: format!("{PARAM_PREFIX}{name}"),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Generates circular tool motions through a center or an interim point.
///
/// Immutable after construction and safe to share between threads.
pub struct CircTrajectoryGenerator {
    kinematics: Arc<dyn Kinematics>,
    limits: LimitsContainer,
    cartesian: CartesianLimit,
    config: CircConfig,
}

impl CircTrajectoryGenerator {
    /// Create a generator, rejecting incomplete limits up front
    pub fn new(
        kinematics: Arc<dyn Kinematics>,
        limits: LimitsContainer,
        config: CircConfig,
    ) -> Result<Self, ConfigError> {
        limits.validate(kinematics.active_joint_names())?;
        config.validate()?;
        let cartesian = *limits
            .cartesian_limits()
            .ok_or(ConfigError::MissingCartesianLimits)?;

        Ok(CircTrajectoryGenerator {
            kinematics,
            limits,
            cartesian,
            config,
        })
    }

    pub fn limits(&self) -> &LimitsContainer {
        &self.limits
    }

    pub fn config(&self) -> &CircConfig {
        &self.config
    }

    pub fn kinematics(&self) -> &dyn Kinematics {
        self.kinematics.as_ref()
    }

    /// Plan a request, returning the trajectory or the first failure
    pub fn plan(&self, request: &TrajectoryRequest) -> Result<JointTrajectory, GenerationError> {
        let kinematics = self.kinematics.as_ref();
        let validator =
            RequestValidator::new(kinematics, &self.limits, self.config.start_velocity_tolerance);
        let validated = validator.validate(request)?;
        let link = validated.link_name.as_str();
        debug!(link, auxiliary = %validated.auxiliary_kind, "request validated");

        let start_pose = kinematics.forward(&validated.start_positions, link)?;
        let goal_pose = match &validated.goal {
            ValidatedGoal::Joints(positions) => kinematics.forward(positions, link)?,
            ValidatedGoal::Pose(goal) => goal.pose,
        };

        let arc = CircleArc::resolve(
            &start_pose.translation.vector,
            &goal_pose.translation.vector,
            &validated.auxiliary_position,
            validated.auxiliary_kind,
            self.config.colinearity_epsilon,
            self.config.radius_tolerance,
        )?;
        debug!(center = ?arc.center, radius = arc.radius, sweep = arc.sweep, "arc resolved");

        let path = ArcPath::new(arc, start_pose.rotation, goal_pose.rotation);
        let law = PathTimeLaw::new(
            &path,
            &self.cartesian,
            request.velocity_scale,
            request.acceleration_scale,
        )?;

        let builder =
            JointTrajectoryBuilder::new(kinematics, &self.limits, link, self.config.sampling_time);
        let trajectory = builder.build(&path, &law, &validated.start_positions)?;

        if let ValidatedGoal::Pose(goal) = &validated.goal {
            self.check_goal_reached(&trajectory, link, goal)?;
        }
        Ok(trajectory)
    }

    /// The last waypoint must place `link` within the goal tolerances
    fn check_goal_reached(
        &self,
        trajectory: &JointTrajectory,
        link: &str,
        goal: &PoseGoal,
    ) -> Result<(), GenerationError> {
        let Some(last) = trajectory.last() else {
            return Err(GenerationError::InvalidMotionPlan("trajectory is empty".to_string()));
        };
        let reached = self.kinematics.forward(&last.positions, link)?;

        let position_error = (reached.translation.vector - goal.pose.translation.vector).norm();
        let orientation_error = reached.rotation.angle_to(&goal.pose.rotation);
        if position_error > goal.position_tolerance
            || orientation_error > goal.orientation_tolerance
        {
            return Err(GenerationError::InvalidMotionPlan(format!(
                "final waypoint misses the goal by {position_error:.6} m and \
                 {orientation_error:.6} rad"
            )));
        }
        Ok(())
    }
}

impl TrajectoryGenerator for CircTrajectoryGenerator {
    fn name(&self) -> &str {
        "circ"
    }

    fn generate(&self, request: &TrajectoryRequest) -> GenerationResult {
        let started = Instant::now();
        match self.plan(request) {
            Ok(trajectory) => {
                info!(
                    waypoints = trajectory.len(),
                    duration = trajectory.duration(),
                    "circular trajectory planned"
                );
                GenerationResult::from_trajectory(trajectory, started.elapsed())
            }
            Err(err) => {
                warn!(code = err.code().value(), "circular planning failed: {err}");
                GenerationResult::from_error(&err, started.elapsed())
            }
        }
    }
}
