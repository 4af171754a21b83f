//! Trapezoidal time parameterization
//!
//! A [`TrapezoidalProfile`] moves a scalar from 0 to `distance` with an
//! accelerate / cruise / decelerate law, starting and ending at rest.
//! [`PathTimeLaw`] maps it onto the normalized path parameter of an arc.

use tracing::debug;

use super::arc::ArcPath;
use crate::error::GenerationError;
use crate::limits::CartesianLimit;

/// Rest-to-rest trapezoidal velocity profile.
///
/// Falls back to a triangular profile when the distance is too short to
/// reach the velocity bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidalProfile {
    distance: f64,
    peak_velocity: f64,
    acceleration: f64,
    deceleration: f64,
    t_acc: f64,
    t_cruise: f64,
    t_dec: f64,
}

impl TrapezoidalProfile {
    pub fn new(distance: f64, max_velocity: f64, acceleration: f64, deceleration: f64) -> Self {
        let d_acc = max_velocity * max_velocity / (2.0 * acceleration);
        let d_dec = max_velocity * max_velocity / (2.0 * deceleration);

        let peak_velocity = if d_acc + d_dec > distance {
            (2.0 * distance * acceleration * deceleration / (acceleration + deceleration)).sqrt()
        } else {
            max_velocity
        };

        let t_acc = peak_velocity / acceleration;
        let t_dec = peak_velocity / deceleration;
        let cruise_distance = distance
            - peak_velocity * peak_velocity / (2.0 * acceleration)
            - peak_velocity * peak_velocity / (2.0 * deceleration);
        let t_cruise = if peak_velocity > 0.0 {
            (cruise_distance / peak_velocity).max(0.0)
        } else {
            0.0
        };

        TrapezoidalProfile {
            distance,
            peak_velocity,
            acceleration,
            deceleration,
            t_acc,
            t_cruise,
            t_dec,
        }
    }

    pub fn duration(&self) -> f64 {
        self.t_acc + self.t_cruise + self.t_dec
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn peak_velocity(&self) -> f64 {
        self.peak_velocity
    }

    /// End of the acceleration and start of the deceleration phase
    pub fn phase_times(&self) -> [f64; 2] {
        [self.t_acc, self.t_acc + self.t_cruise]
    }

    pub fn position(&self, t: f64) -> f64 {
        let t_end = self.duration();
        if t <= 0.0 {
            0.0
        } else if t < self.t_acc {
            0.5 * self.acceleration * t * t
        } else if t < self.t_acc + self.t_cruise {
            let ramp = 0.5 * self.acceleration * self.t_acc * self.t_acc;
            ramp + self.peak_velocity * (t - self.t_acc)
        } else if t < t_end {
            let remaining = t_end - t;
            self.distance - 0.5 * self.deceleration * remaining * remaining
        } else {
            self.distance
        }
    }

    pub fn velocity(&self, t: f64) -> f64 {
        let t_end = self.duration();
        if t <= 0.0 || t >= t_end {
            0.0
        } else if t < self.t_acc {
            self.acceleration * t
        } else if t < self.t_acc + self.t_cruise {
            self.peak_velocity
        } else {
            self.deceleration * (t_end - t)
        }
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        let t_end = self.duration();
        if t <= 0.0 || t >= t_end {
            0.0
        } else if t < self.t_acc {
            self.acceleration
        } else if t < self.t_acc + self.t_cruise {
            0.0
        } else {
            -self.deceleration
        }
    }
}

/// Time law `s(t)` of an arc path under cartesian limits.
///
/// The profile runs over an equivalent length
/// `max(arc length, (v_trans / v_rot) * rotation angle)`, which keeps the
/// translational and the rotational velocity bound at the same time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTimeLaw {
    profile: TrapezoidalProfile,
}

impl PathTimeLaw {
    pub fn new(
        path: &ArcPath,
        limits: &CartesianLimit,
        velocity_scale: f64,
        acceleration_scale: f64,
    ) -> Result<Self, GenerationError> {
        let equivalent_radius = limits.max_trans_vel / limits.max_rot_vel;
        let length = path
            .arc()
            .length()
            .max(equivalent_radius * path.rotation_angle());

        let profile = TrapezoidalProfile::new(
            length,
            velocity_scale * limits.max_trans_vel,
            acceleration_scale * limits.max_trans_acc,
            acceleration_scale * limits.max_trans_dec,
        );

        let duration = profile.duration();
        if !(length > 0.0 && duration.is_finite() && duration > 0.0) {
            return Err(GenerationError::PlanningFailed(format!(
                "no feasible time law for path length {length} (duration {duration})"
            )));
        }

        debug!(
            length,
            duration,
            peak_velocity = profile.peak_velocity(),
            "time law computed"
        );
        Ok(PathTimeLaw { profile })
    }

    pub fn duration(&self) -> f64 {
        self.profile.duration()
    }

    /// Times at which the path acceleration switches
    pub fn phase_boundaries(&self) -> [f64; 2] {
        self.profile.phase_times()
    }

    /// Path parameter and its first two time derivatives at `t`
    pub fn evaluate(&self, t: f64) -> (f64, f64, f64) {
        let length = self.profile.distance();
        (
            (self.profile.position(t) / length).clamp(0.0, 1.0),
            self.profile.velocity(t) / length,
            self.profile.acceleration(t) / length,
        )
    }
}
