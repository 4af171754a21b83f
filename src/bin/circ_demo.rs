use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use nalgebra::Vector3;
use prometheus_motion::common::pose_from_xyz_rpy;
use prometheus_motion::control::trajectory::{AuxiliaryConstraint, AuxiliaryKind, GoalSpec};
use prometheus_motion::kinematics::gantry::TOOL_LINK;
use prometheus_motion::{
    GantryKinematics, JointState, Kinematics, MotionCore, PlanningStack, TrajectoryRequest,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn demo_params(kinematics: &GantryKinematics) -> HashMap<String, f64> {
    let mut params = HashMap::new();
    for (index, joint) in kinematics.active_joint_names().iter().enumerate() {
        let prismatic = index < 3;
        let (velocity, acceleration) = if prismatic { (0.5, 1.0) } else { (1.5, 3.0) };
        params.insert(format!("joint_limits/{joint}/max_velocity"), velocity);
        params.insert(format!("joint_limits/{joint}/max_acceleration"), acceleration);
        let bound = if prismatic { 2.0 } else { 2.0 * std::f64::consts::PI };
        params.insert(format!("joint_limits/{joint}/min_position"), -bound);
        params.insert(format!("joint_limits/{joint}/max_position"), bound);
    }
    params.insert("cartesian_limits/max_trans_vel".to_string(), 0.5);
    params.insert("cartesian_limits/max_trans_acc".to_string(), 1.0);
    params.insert("cartesian_limits/max_trans_dec".to_string(), 1.0);
    params.insert("cartesian_limits/max_rot_vel".to_string(), 1.0);
    params.insert("circ/sampling_time".to_string(), 0.05);
    params
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let kinematics = GantryKinematics::new();
    let mut stack = PlanningStack::new(Arc::new(kinematics.clone()));
    stack.configure(&demo_params(&kinematics));

    let mut core = MotionCore::new();
    core.register(stack);
    core.init().context("failed to initialize motion core")?;

    // Half circle of radius 0.25 m in the plane z = 0.5, turning the tool by 90°
    let start = JointState::from_positions(
        kinematics.active_joint_names(),
        &[0.25, 0.0, 0.5, 0.0, 0.1, 0.0],
    );
    let goal = pose_from_xyz_rpy(Vector3::new(-0.25, 0.0, 0.5), 0.0, 0.1, FRAC_PI_2);
    let interim = pose_from_xyz_rpy(Vector3::new(0.0, 0.25, 0.5), 0.0, 0.0, 0.0);
    let request = TrajectoryRequest::new(start, GoalSpec::pose(TOOL_LINK, goal))
        .with_auxiliary(AuxiliaryConstraint::new(AuxiliaryKind::Interim, TOOL_LINK, interim))
        .with_scaling(0.5, 0.5);

    let stack = core
        .planning_stack_mut()
        .context("planning stack is not registered")?;
    let result = stack.plan(&request)?;
    if !result.success() {
        bail!("planning failed ({}): {}", result.error_code.value(), result.message);
    }

    if let Some(trajectory) = &result.trajectory {
        info!(
            waypoints = trajectory.len(),
            duration = trajectory.duration(),
            planning_time_us = result.planning_time.as_micros() as u64,
            "trajectory ready"
        );
        for point in trajectory.points() {
            println!(
                "t={:6.3}  q={:?}",
                point.time_from_start,
                point
                    .positions
                    .iter()
                    .map(|q| format!("{q:+.4}"))
                    .collect::<Vec<_>>()
            );
        }
    }

    core.shutdown().context("failed to shut down motion core")?;
    Ok(())
}
