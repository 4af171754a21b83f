//! Circular arc geometry and cartesian sampling
//!
//! [`CircleArc::resolve`] turns start, goal and one auxiliary point into a
//! circle and a signed sweep. [`ArcPath`] samples that circle together with
//! a slerp of the start and goal orientations over a path parameter
//! `s` in `[0, 1]`.

use std::f64::consts::TAU;

use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};

use super::request::AuxiliaryKind;
use crate::common::Pose;
use crate::error::GenerationError;

/// A circle segment in 3-D.
///
/// Points are `center + radius * (cos(φ) * e1 + sin(φ) * e2)` for
/// `φ` in `[0, sweep]`, with `e1` pointing at the start and
/// `e2 = axis × e1`.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleArc {
    pub center: Vector3<f64>,
    pub radius: f64,
    pub axis: Unit<Vector3<f64>>,
    /// Sweep angle about `axis`, in `(0, 2π)`
    pub sweep: f64,
    e1: Vector3<f64>,
    e2: Vector3<f64>,
}

impl CircleArc {
    /// Resolve the circle through `start` and `goal` defined by `aux`.
    ///
    /// `epsilon` guards coincident and collinear inputs. For a center point,
    /// `radius_tolerance` bounds how far the goal may sit off the circle
    /// fixed by the start.
    pub fn resolve(
        start: &Vector3<f64>,
        goal: &Vector3<f64>,
        aux: &Vector3<f64>,
        kind: AuxiliaryKind,
        epsilon: f64,
        radius_tolerance: f64,
    ) -> Result<Self, GenerationError> {
        let min_spacing = (goal - start)
            .norm()
            .min((aux - start).norm())
            .min((goal - aux).norm());
        if min_spacing <= epsilon {
            return Err(GenerationError::InvalidMotionPlan(format!(
                "start, goal and {kind} point are (nearly) coincident"
            )));
        }

        match kind {
            AuxiliaryKind::Center => Self::from_center(start, goal, aux, epsilon, radius_tolerance),
            AuxiliaryKind::Interim => Self::from_interim(start, goal, aux, epsilon),
        }
    }

    fn from_center(
        start: &Vector3<f64>,
        goal: &Vector3<f64>,
        center: &Vector3<f64>,
        epsilon: f64,
        radius_tolerance: f64,
    ) -> Result<Self, GenerationError> {
        let a = start - center;
        let b = goal - center;
        let radius = a.norm();

        if (b.norm() - radius).abs() > radius_tolerance {
            return Err(GenerationError::InvalidMotionPlan(format!(
                "start and goal are not equidistant from the center ({radius:.6} vs {:.6})",
                b.norm()
            )));
        }

        let w = a.cross(&b);
        if w.norm() <= epsilon {
            return Err(GenerationError::InvalidMotionPlan(
                "start, goal and center are collinear, the circle is not unique".to_string(),
            ));
        }

        // Without an interim point the shorter arc is the only sensible one.
        let sweep = w.norm().atan2(a.dot(&b));
        Ok(Self::with_basis(*center, &a, Unit::new_normalize(w), sweep))
    }

    fn from_interim(
        start: &Vector3<f64>,
        goal: &Vector3<f64>,
        interim: &Vector3<f64>,
        epsilon: f64,
    ) -> Result<Self, GenerationError> {
        let t = interim - start;
        let u = goal - start;
        let v = goal - interim;
        let w = t.cross(&u);

        if w.norm() <= epsilon {
            return Err(GenerationError::InvalidMotionPlan(
                "start, interim and goal are collinear, no circle passes through them".to_string(),
            ));
        }

        let center = start
            + (u * t.dot(&t) * u.dot(&v) - t * u.dot(&u) * t.dot(&v)) * 0.5 / w.norm_squared();

        // start -> interim -> goal runs positively about t × u, so the
        // positive sweep from start to goal passes the interim point.
        let axis = Unit::new_normalize(w);
        let a = start - center;
        let b = goal - center;
        let mut sweep = axis.dot(&a.cross(&b)).atan2(a.dot(&b));
        if sweep <= 0.0 {
            sweep += TAU;
        }
        Ok(Self::with_basis(center, &a, axis, sweep))
    }

    fn with_basis(
        center: Vector3<f64>,
        start_offset: &Vector3<f64>,
        axis: Unit<Vector3<f64>>,
        sweep: f64,
    ) -> Self {
        let radius = start_offset.norm();
        let e1 = start_offset / radius;
        let e2 = axis.cross(&e1);
        CircleArc {
            center,
            radius,
            axis,
            sweep,
            e1,
            e2,
        }
    }

    /// Arc length from start to goal
    pub fn length(&self) -> f64 {
        self.radius * self.sweep
    }

    /// Position at path parameter `s`
    pub fn position(&self, s: f64) -> Vector3<f64> {
        let phi = s.clamp(0.0, 1.0) * self.sweep;
        self.center + (self.e1 * phi.cos() + self.e2 * phi.sin()) * self.radius
    }

    /// Derivative of the position with respect to `s`
    pub fn tangent(&self, s: f64) -> Vector3<f64> {
        let phi = s.clamp(0.0, 1.0) * self.sweep;
        (self.e2 * phi.cos() - self.e1 * phi.sin()) * (self.radius * self.sweep)
    }
}

/// Cartesian path along a circle arc with slerped orientation.
///
/// Stateless: the same `s` always yields the same pose.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPath {
    arc: CircleArc,
    start_orientation: UnitQuaternion<f64>,
    goal_orientation: UnitQuaternion<f64>,
    rotation: Vector3<f64>,
}

impl ArcPath {
    pub fn new(
        arc: CircleArc,
        start_orientation: UnitQuaternion<f64>,
        goal_orientation: UnitQuaternion<f64>,
    ) -> Self {
        let rotation = (goal_orientation * start_orientation.inverse()).scaled_axis();
        ArcPath {
            arc,
            start_orientation,
            goal_orientation,
            rotation,
        }
    }

    pub fn arc(&self) -> &CircleArc {
        &self.arc
    }

    /// Total orientation change in radians, in `[0, π]`
    pub fn rotation_angle(&self) -> f64 {
        self.rotation.norm()
    }

    /// Pose at path parameter `s`
    pub fn sample(&self, s: f64) -> Pose {
        let s = s.clamp(0.0, 1.0);
        let orientation = self
            .start_orientation
            .try_slerp(&self.goal_orientation, s, 1e-12)
            .unwrap_or(self.start_orientation);
        Pose::from_parts(Translation3::from(self.arc.position(s)), orientation)
    }

    /// Linear and angular velocity at `s` when the parameter moves at `s_dot`
    pub fn twist(&self, s: f64, s_dot: f64) -> (Vector3<f64>, Vector3<f64>) {
        (self.arc.tangent(s) * s_dot, self.rotation * s_dot)
    }
}
