use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use prometheus_motion::common::pose_from_xyz_rpy;
use prometheus_motion::control::trajectory::{AuxiliaryConstraint, AuxiliaryKind, GoalSpec};
use prometheus_motion::kinematics::gantry::TOOL_LINK;
use prometheus_motion::{
    CartesianLimit, CircConfig, CircTrajectoryGenerator, ConfigError, ErrorCode, GantryKinematics,
    JointLimit, JointState, JointTrajectory, Kinematics, LimitsContainer, Pose, TrajectoryGenerator,
    TrajectoryRequest,
};

const Z: f64 = 0.5;
const RADIUS: f64 = 0.5;

fn limits(kin: &GantryKinematics) -> LimitsContainer {
    let mut limits = LimitsContainer::new();
    limits.set_cartesian_limits(CartesianLimit::new(1.0, 2.0, 2.0, 1.0));
    for (index, joint) in kin.active_joint_names().iter().enumerate() {
        let limit = if index < 3 {
            JointLimit::new(0.4, 0.8).with_position_bounds(-1.0, 1.0)
        } else {
            JointLimit::new(1.5, 3.0)
        };
        limits.add_joint_limit(joint, limit);
    }
    limits
}

fn generator() -> CircTrajectoryGenerator {
    let kin = GantryKinematics::new();
    let limits = limits(&kin);
    CircTrajectoryGenerator::new(Arc::new(kin), limits, CircConfig::default()).unwrap()
}

fn start_state() -> JointState {
    JointState::from_positions(
        GantryKinematics::new().active_joint_names(),
        &[RADIUS, 0.0, Z, 0.0, 0.0, 0.0],
    )
}

fn point(x: f64, y: f64) -> Pose {
    Pose::translation(x, y, Z)
}

fn request(goal: Pose, kind: AuxiliaryKind, aux: Pose) -> TrajectoryRequest {
    TrajectoryRequest::new(start_state(), GoalSpec::pose(TOOL_LINK, goal))
        .with_auxiliary(AuxiliaryConstraint::new(kind, TOOL_LINK, aux))
}

fn center_at_origin() -> AuxiliaryConstraint {
    AuxiliaryConstraint::new(AuxiliaryKind::Center, TOOL_LINK, point(0.0, 0.0))
}

/// Quarter circle about the origin of the z = 0.5 plane
fn center_request() -> TrajectoryRequest {
    request(point(0.0, RADIUS), AuxiliaryKind::Center, point(0.0, 0.0))
}

/// Half circle through (0, r)
fn interim_request() -> TrajectoryRequest {
    request(point(-RADIUS, 0.0), AuxiliaryKind::Interim, point(0.0, RADIUS))
}

fn tool_positions(trajectory: &JointTrajectory) -> Vec<Vector3<f64>> {
    let kin = GantryKinematics::new();
    trajectory
        .points()
        .iter()
        .map(|p| kin.forward(&p.positions, TOOL_LINK).unwrap().translation.vector)
        .collect()
}

fn code_of(request: &TrajectoryRequest) -> ErrorCode {
    generator().generate(request).error_code
}

#[test]
fn center_arc_stays_on_the_circle() {
    let result = generator().generate(&center_request());
    assert!(result.success(), "{}", result.message);
    let positions = tool_positions(result.trajectory.as_ref().unwrap());

    let center = Vector3::new(0.0, 0.0, Z);
    let radius = (positions[0] - center).norm();
    for position in &positions {
        assert_abs_diff_eq!((position - center).norm(), radius, epsilon = 1e-6);
        assert_abs_diff_eq!(position.z, Z, epsilon = 1e-9);
    }
}

#[test]
fn trajectory_ends_at_rest() {
    for request in [center_request(), interim_request()] {
        let result = generator().generate(&request);
        assert!(result.success(), "{}", result.message);
        let trajectory = result.trajectory.unwrap();
        let last = trajectory.last().unwrap();
        for (velocity, acceleration) in last.velocities.iter().zip(&last.accelerations) {
            assert_abs_diff_eq!(*velocity, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(*acceleration, 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn every_waypoint_has_one_entry_per_joint() {
    let result = generator().generate(&interim_request());
    let trajectory = result.trajectory.unwrap();
    let kin = GantryKinematics::new();
    assert_eq!(trajectory.joint_names(), kin.active_joint_names());
    assert!(trajectory.len() > 2);
    for point in trajectory.points() {
        assert_eq!(point.positions.len(), 6);
        assert_eq!(point.velocities.len(), 6);
        assert_eq!(point.accelerations.len(), 6);
    }
    assert_eq!(trajectory.first().unwrap().time_from_start, 0.0);
    for pair in trajectory.points().windows(2) {
        assert!(pair[1].time_from_start > pair[0].time_from_start);
    }
}

#[test]
fn endpoints_reproduce_start_and_goal_poses() {
    let kin = GantryKinematics::new();
    let goal = pose_from_xyz_rpy(Vector3::new(0.0, RADIUS, Z), 0.1, -0.2, 0.5);
    let request = TrajectoryRequest::new(start_state(), GoalSpec::pose(TOOL_LINK, goal))
        .with_auxiliary(center_at_origin());

    let result = generator().generate(&request);
    assert!(result.success(), "{}", result.message);
    let trajectory = result.trajectory.unwrap();

    assert_eq!(trajectory.first().unwrap().positions, start_state().positions);
    let reached = kin.forward(&trajectory.last().unwrap().positions, TOOL_LINK).unwrap();
    let miss = (reached.translation.vector - goal.translation.vector).norm();
    assert_abs_diff_eq!(miss, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(reached.rotation.angle_to(&goal.rotation), 0.0, epsilon = 1e-9);
}

#[test]
fn joint_goal_is_reached() {
    let kin = GantryKinematics::new();
    let goal_positions = [0.0, RADIUS, Z, 0.3, 0.0, 0.0];
    let goal = GoalSpec::joints(kin.active_joint_names(), &goal_positions);
    let request = TrajectoryRequest::new(start_state(), goal).with_auxiliary(center_at_origin());

    let result = generator().generate(&request);
    assert!(result.success(), "{}", result.message);
    let last = result.trajectory.unwrap().last().cloned().unwrap();
    for (reached, expected) in last.positions.iter().zip(goal_positions) {
        assert_abs_diff_eq!(*reached, expected, epsilon = 1e-9);
    }
}

#[test]
fn moving_start_state_is_rejected() {
    let mut request = center_request();
    request.start_state.velocities = vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    assert_eq!(code_of(&request), ErrorCode::InvalidRobotState);

    request.start_state.velocities = vec![1e-16; 6];
    assert_eq!(code_of(&request), ErrorCode::Success);
}

#[test]
fn coincident_points_are_rejected() {
    let request = request(
        point(RADIUS + 2e-9, 2e-9),
        AuxiliaryKind::Interim,
        point(RADIUS + 1e-9, 1e-9),
    );
    assert_eq!(code_of(&request), ErrorCode::InvalidMotionPlan);
}

#[test]
fn points_a_hair_apart_are_rejected_for_both_kinds() {
    let eps = 1e-8;
    for kind in [AuxiliaryKind::Center, AuxiliaryKind::Interim] {
        let aux = Pose::translation(RADIUS + eps, eps, Z + eps);
        let goal = Pose::translation(RADIUS - eps, -eps, Z - eps);
        let request = request(goal, kind, aux);
        assert_eq!(code_of(&request), ErrorCode::InvalidMotionPlan, "{kind}");
    }
}

#[test]
fn collinear_center_is_ambiguous_but_interim_is_not() {
    let ambiguous = request(point(-RADIUS, 0.0), AuxiliaryKind::Center, point(0.0, 0.0));
    assert_eq!(code_of(&ambiguous), ErrorCode::InvalidMotionPlan);

    let result = generator().generate(&interim_request());
    assert!(result.success(), "{}", result.message);
    let positions = tool_positions(result.trajectory.as_ref().unwrap());
    let center = Vector3::new(0.0, 0.0, Z);
    for position in &positions {
        assert_abs_diff_eq!((position - center).norm(), RADIUS, epsilon = 1e-6);
        assert!(position.y >= -1e-9);
    }
    let top = positions.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    assert!(top > RADIUS - 0.01);
}

#[test]
fn interim_point_selects_the_major_arc() {
    // start at 0°, interim at 180°, goal at 270°
    let request = request(point(0.0, -RADIUS), AuxiliaryKind::Interim, point(-RADIUS, 0.0));
    let result = generator().generate(&request);
    assert!(result.success(), "{}", result.message);

    let positions = tool_positions(result.trajectory.as_ref().unwrap());
    let leftmost = positions.iter().map(|p| p.x).fold(f64::MAX, f64::min);
    let topmost = positions.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    assert!(leftmost < -RADIUS + 0.01);
    assert!(topmost > RADIUS - 0.01);

    let last = positions.last().unwrap();
    assert_abs_diff_eq!((last - Vector3::new(0.0, -RADIUS, Z)).norm(), 0.0, epsilon = 1e-9);
}

#[test]
fn full_scaling_exceeds_joint_limits() {
    assert_eq!(code_of(&interim_request()), ErrorCode::Success);
    assert_eq!(
        code_of(&interim_request().with_scaling(1.0, 0.1)),
        ErrorCode::PlanningFailed
    );
    assert_eq!(
        code_of(&interim_request().with_scaling(0.1, 1.0)),
        ErrorCode::PlanningFailed
    );
}

#[test]
fn abrupt_cartesian_braking_exceeds_joint_deceleration() {
    let plan_with = |trans_dec: f64| {
        let kin = GantryKinematics::new();
        let mut limits = limits(&kin);
        limits.set_cartesian_limits(CartesianLimit::new(1.0, 0.5, trans_dec, 1.0));
        let generator =
            CircTrajectoryGenerator::new(Arc::new(kin), limits, CircConfig::default()).unwrap();
        generator.generate(&center_request().with_scaling(0.3, 1.0)).error_code
    };

    assert_eq!(plan_with(0.5), ErrorCode::Success);
    assert_eq!(plan_with(20.0), ErrorCode::PlanningFailed);
}

#[test]
fn malformed_auxiliary_point_is_invalid_motion_plan() {
    let mut missing = center_request();
    missing.auxiliary = None;
    assert_eq!(code_of(&missing), ErrorCode::InvalidMotionPlan);

    let mut unnamed = center_request();
    unnamed.auxiliary.as_mut().unwrap().name = String::new();
    assert_eq!(code_of(&unnamed), ErrorCode::InvalidMotionPlan);

    let mut two_poses = center_request();
    two_poses.auxiliary.as_mut().unwrap().poses.push(point(0.0, 0.1));
    assert_eq!(code_of(&two_poses), ErrorCode::InvalidMotionPlan);
}

#[test]
fn auxiliary_link_must_match_goal_link() {
    let mut request = center_request();
    request.auxiliary.as_mut().unwrap().link_name = "flange".to_string();
    let result = generator().generate(&request);
    assert_eq!(result.error_code, ErrorCode::InvalidLinkName);
    assert_eq!(result.error_code.value(), -18);
    assert!(result.trajectory.is_none());
}

#[test]
fn extra_joint_constraint_is_rejected() {
    let kin = GantryKinematics::new();
    let mut names: Vec<String> = kin.active_joint_names().to_vec();
    names.push("gripper".to_string());
    let request = TrajectoryRequest::new(
        start_state(),
        GoalSpec::joints(&names, &[0.0, RADIUS, Z, 0.0, 0.0, 0.0, 0.0]),
    )
    .with_auxiliary(center_at_origin());
    assert_eq!(code_of(&request), ErrorCode::InvalidGoalConstraints);
}

#[test]
fn center_off_the_bisector_is_rejected() {
    let request = request(point(0.0, RADIUS + 0.1), AuxiliaryKind::Center, point(0.0, 0.0));
    assert_eq!(code_of(&request), ErrorCode::InvalidMotionPlan);
}

#[test]
fn missing_cartesian_limits_fail_construction() {
    let kin = GantryKinematics::new();
    let mut limits = LimitsContainer::new();
    for joint in kin.active_joint_names() {
        limits.add_joint_limit(joint, JointLimit::new(1.0, 1.0));
    }
    let result = CircTrajectoryGenerator::new(Arc::new(kin), limits, CircConfig::default());
    assert!(matches!(result, Err(ConfigError::MissingCartesianLimits)));
}

#[test]
fn generator_is_shared_across_threads() {
    let generator = generator();
    let expected = generator.generate(&interim_request()).trajectory;
    assert!(expected.is_some());

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| generator.generate(&interim_request()).trajectory))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
