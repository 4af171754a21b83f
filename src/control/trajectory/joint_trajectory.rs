//! Joint trajectories and their construction from a cartesian path

use nalgebra::DVector;
use tracing::debug;

use super::arc::ArcPath;
use super::profile::PathTimeLaw;
use crate::error::GenerationError;
use crate::kinematics::Kinematics;
use crate::limits::LimitsContainer;

// Slack on limit comparisons for floating point noise
const LIMIT_SLACK: f64 = 1e-9;
const SVD_EPS: f64 = 1e-10;
// Phase switches closer than this to a check time are not checked twice
const PHASE_MERGE: f64 = 1e-6;

/// One time-stamped waypoint, one value per active joint in each array
#[derive(Debug, Clone, PartialEq)]
pub struct JointTrajectoryPoint {
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
    /// Seconds since the start of the motion
    pub time_from_start: f64,
}

/// Time-parameterized joint motion.
///
/// Points are strictly increasing in time, start at `t = 0` and end at rest.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTrajectory {
    joint_names: Vec<String>,
    points: Vec<JointTrajectoryPoint>,
}

impl JointTrajectory {
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn points(&self) -> &[JointTrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&JointTrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&JointTrajectoryPoint> {
        self.points.last()
    }

    /// Time of the last waypoint
    pub fn duration(&self) -> f64 {
        self.last().map(|p| p.time_from_start).unwrap_or(0.0)
    }
}

/// Samples a time law along an arc path and converts it to joint space.
pub struct JointTrajectoryBuilder<'a> {
    kinematics: &'a dyn Kinematics,
    limits: &'a LimitsContainer,
    link: &'a str,
    sampling_time: f64,
}

impl<'a> JointTrajectoryBuilder<'a> {
    pub fn new(
        kinematics: &'a dyn Kinematics,
        limits: &'a LimitsContainer,
        link: &'a str,
        sampling_time: f64,
    ) -> Self {
        JointTrajectoryBuilder {
            kinematics,
            limits,
            link,
            sampling_time,
        }
    }

    /// Sample times from 0 to `duration`, always ending exactly at `duration`
    pub fn sample_times(&self, duration: f64) -> Vec<f64> {
        let mut times = Vec::new();
        let mut k = 0usize;
        loop {
            let t = k as f64 * self.sampling_time;
            if t >= duration - LIMIT_SLACK {
                break;
            }
            times.push(t);
            k += 1;
        }
        times.push(duration);
        times
    }

    /// Build the joint trajectory starting from `start_positions`.
    ///
    /// Joint limits are checked between consecutive sample times and at the
    /// phase switches of the time law, including the final stop. Any inverse
    /// kinematics failure aborts the whole build.
    pub fn build(
        &self,
        path: &ArcPath,
        law: &PathTimeLaw,
        start_positions: &[f64],
    ) -> Result<JointTrajectory, GenerationError> {
        let joint_names = self.kinematics.active_joint_names().to_vec();
        let dof = joint_names.len();
        let duration = law.duration();
        let times = self.sample_times(duration);
        let checks = check_times(&times, law);
        debug!(samples = times.len(), checks = checks.len(), link = self.link, "sampling arc");

        let mut points: Vec<JointTrajectoryPoint> = Vec::with_capacity(times.len());
        points.push(JointTrajectoryPoint {
            positions: start_positions.to_vec(),
            velocities: vec![0.0; dof],
            accelerations: vec![0.0; dof],
            time_from_start: 0.0,
        });

        let mut seed = start_positions.to_vec();
        let mut checked_time = 0.0;
        let mut checked_velocities = vec![0.0; dof];

        for (t, is_waypoint) in checks {
            let (s, s_dot, _) = law.evaluate(t);
            let pose = path.sample(s);

            let positions = self.kinematics.inverse(&pose, self.link, &seed).map_err(|e| {
                GenerationError::InvalidMotionPlan(format!(
                    "inverse kinematics failed at t = {t:.3} s: {e}"
                ))
            })?;
            self.check_positions(&joint_names, &positions, t)?;

            let at_end = t >= duration;
            let velocities = if at_end {
                vec![0.0; dof]
            } else {
                self.joint_velocities(path, &positions, s, s_dot)?
            };
            self.check_dynamics(
                &joint_names,
                &checked_velocities,
                &velocities,
                t - checked_time,
                t,
            )?;

            seed.clone_from(&positions);
            checked_time = t;
            checked_velocities.clone_from(&velocities);

            if is_waypoint {
                let previous = &points[points.len() - 1];
                let accelerations = if at_end {
                    vec![0.0; dof]
                } else {
                    let dt = t - previous.time_from_start;
                    velocities
                        .iter()
                        .zip(&previous.velocities)
                        .map(|(v, v_prev)| (v - v_prev) / dt)
                        .collect()
                };
                points.push(JointTrajectoryPoint {
                    positions,
                    velocities,
                    accelerations,
                    time_from_start: t,
                });
            }
        }

        Ok(JointTrajectory {
            joint_names,
            points,
        })
    }

    fn joint_velocities(
        &self,
        path: &ArcPath,
        positions: &[f64],
        s: f64,
        s_dot: f64,
    ) -> Result<Vec<f64>, GenerationError> {
        let (linear, angular) = path.twist(s, s_dot);
        let twist = DVector::from_iterator(6, linear.iter().chain(angular.iter()).copied());
        let jacobian = self.kinematics.jacobian(positions, self.link)?;

        jacobian
            .svd(true, true)
            .solve(&twist, SVD_EPS)
            .map(|q_dot| q_dot.iter().copied().collect())
            .map_err(|e| {
                GenerationError::InvalidMotionPlan(format!("jacobian inversion failed: {e}"))
            })
    }

    fn check_positions(
        &self,
        joints: &[String],
        positions: &[f64],
        t: f64,
    ) -> Result<(), GenerationError> {
        for (joint, &position) in joints.iter().zip(positions) {
            if let Some(limit) = self.limits.joint_limit(joint) {
                if !limit.satisfies_position(position) {
                    return Err(GenerationError::InvalidMotionPlan(format!(
                        "joint '{joint}' leaves its position limits at t = {t:.3} s ({position:.4})"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check joint speeds at `t` and the mean acceleration since the
    /// previous check, `dt` seconds earlier
    fn check_dynamics(
        &self,
        joints: &[String],
        previous: &[f64],
        velocities: &[f64],
        dt: f64,
        t: f64,
    ) -> Result<(), GenerationError> {
        for ((joint, &v_prev), &velocity) in joints.iter().zip(previous).zip(velocities) {
            let Some(limit) = self.limits.joint_limit(joint) else {
                continue;
            };
            if velocity.abs() > limit.max_velocity + LIMIT_SLACK {
                return Err(GenerationError::PlanningFailed(format!(
                    "joint '{joint}' velocity {velocity:.4} exceeds {:.4} at t = {t:.3} s",
                    limit.max_velocity
                )));
            }
            let acceleration = (velocity - v_prev) / dt;
            let bound = if velocity.abs() >= v_prev.abs() {
                limit.max_acceleration
            } else {
                limit.max_deceleration
            };
            if acceleration.abs() > bound + LIMIT_SLACK {
                return Err(GenerationError::PlanningFailed(format!(
                    "joint '{joint}' acceleration {acceleration:.4} exceeds {bound:.4} \
                     at t = {t:.3} s"
                )));
            }
        }
        Ok(())
    }
}

/// Times after the start at which joint limits are checked, flagged with
/// whether they are also waypoints. Phase switches of the time law are
/// added unless they fall on a sample time.
fn check_times(times: &[f64], law: &PathTimeLaw) -> Vec<(f64, bool)> {
    let mut checks: Vec<(f64, bool)> = times.iter().skip(1).map(|&t| (t, true)).collect();
    for boundary in law.phase_boundaries() {
        let inside = boundary > PHASE_MERGE && boundary < law.duration() - PHASE_MERGE;
        let known = checks.iter().any(|&(t, _)| (t - boundary).abs() < PHASE_MERGE);
        if inside && !known {
            checks.push((boundary, false));
        }
    }
    checks.sort_by(|a, b| a.0.total_cmp(&b.0));
    checks
}
