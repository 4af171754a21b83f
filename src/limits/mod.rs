//! Joint and cartesian limits
//!
//! Limits are aggregated once from a flat parameter map and frozen inside
//! the generator. Keys follow the layout
//! `joint_limits/<joint>/<field>` and `cartesian_limits/<field>`.

use std::collections::{BTreeMap, HashMap};

use crate::error::ConfigError;

const JOINT_PREFIX: &str = "joint_limits/";
const CARTESIAN_PREFIX: &str = "cartesian_limits/";

/// Kinematic bounds of a single joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub max_velocity: f64,
    pub max_acceleration: f64,
    /// Magnitude of the allowed deceleration
    pub max_deceleration: f64,
    /// Optional `(min, max)` position bounds
    pub position: Option<(f64, f64)>,
}

impl JointLimit {
    /// Limit with deceleration equal to acceleration and no position bounds
    pub fn new(max_velocity: f64, max_acceleration: f64) -> Self {
        JointLimit {
            max_velocity,
            max_acceleration,
            max_deceleration: max_acceleration,
            position: None,
        }
    }

    pub fn with_deceleration(mut self, max_deceleration: f64) -> Self {
        self.max_deceleration = max_deceleration;
        self
    }

    pub fn with_position_bounds(mut self, min: f64, max: f64) -> Self {
        self.position = Some((min, max));
        self
    }

    /// Whether `position` lies within the configured bounds
    pub fn satisfies_position(&self, position: f64) -> bool {
        match self.position {
            Some((min, max)) => position >= min && position <= max,
            None => true,
        }
    }

    fn validate(&self, joint: &str) -> Result<(), ConfigError> {
        positive(&format!("{joint}/max_velocity"), self.max_velocity)?;
        positive(&format!("{joint}/max_acceleration"), self.max_acceleration)?;
        positive(&format!("{joint}/max_deceleration"), self.max_deceleration)?;
        if let Some((min, max)) = self.position {
            if min > max {
                return Err(ConfigError::InvalidPositionLimits {
                    joint: joint.to_string(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Scalar bounds applied uniformly along a cartesian path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianLimit {
    pub max_trans_vel: f64,
    pub max_trans_acc: f64,
    pub max_trans_dec: f64,
    pub max_rot_vel: f64,
}

impl CartesianLimit {
    pub fn new(
        max_trans_vel: f64,
        max_trans_acc: f64,
        max_trans_dec: f64,
        max_rot_vel: f64,
    ) -> Self {
        CartesianLimit {
            max_trans_vel,
            max_trans_acc,
            max_trans_dec,
            max_rot_vel,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("cartesian_limits/max_trans_vel", self.max_trans_vel)?;
        positive("cartesian_limits/max_trans_acc", self.max_trans_acc)?;
        positive("cartesian_limits/max_trans_dec", self.max_trans_dec)?;
        positive("cartesian_limits/max_rot_vel", self.max_rot_vel)
    }
}

/// All limits known to a generator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitsContainer {
    joint_limits: BTreeMap<String, JointLimit>,
    cartesian: Option<CartesianLimit>,
}

impl LimitsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_joint_limit(&mut self, joint: &str, limit: JointLimit) {
        self.joint_limits.insert(joint.to_string(), limit);
    }

    pub fn set_cartesian_limits(&mut self, limit: CartesianLimit) {
        self.cartesian = Some(limit);
    }

    pub fn joint_limit(&self, joint: &str) -> Option<&JointLimit> {
        self.joint_limits.get(joint)
    }

    pub fn cartesian_limits(&self) -> Option<&CartesianLimit> {
        self.cartesian.as_ref()
    }

    /// Check that the container can drive a generator over `active_joints`
    pub fn validate(&self, active_joints: &[String]) -> Result<(), ConfigError> {
        let cartesian = self.cartesian.as_ref().ok_or(ConfigError::MissingCartesianLimits)?;
        cartesian.validate()?;

        for joint in active_joints {
            let limit = self
                .joint_limits
                .get(joint)
                .ok_or_else(|| ConfigError::MissingJointLimit {
                    joint: joint.clone(),
                })?;
            limit.validate(joint)?;
        }
        Ok(())
    }

    /// Aggregate limits for `joints` from a flat parameter map.
    ///
    /// A joint without any `joint_limits/<joint>/...` key is left out; the
    /// gap surfaces in `validate`. Cartesian limits are only set when at
    /// least one `cartesian_limits/...` key is present.
    pub fn from_params<S: AsRef<str>>(
        params: &HashMap<String, f64>,
        joints: &[S],
    ) -> Result<Self, ConfigError> {
        let mut container = LimitsContainer::new();

        for joint in joints {
            let joint = joint.as_ref();
            let key = |field: &str| format!("{JOINT_PREFIX}{joint}/{field}");
            let has_any = params
                .keys()
                .any(|k| k.starts_with(&format!("{JOINT_PREFIX}{joint}/")));
            if !has_any {
                continue;
            }

            let max_velocity = required(params, &key("max_velocity"))?;
            let max_acceleration = required(params, &key("max_acceleration"))?;
            let max_deceleration = params
                .get(&key("max_deceleration"))
                .map(|d| d.abs())
                .unwrap_or(max_acceleration);

            let mut limit =
                JointLimit::new(max_velocity, max_acceleration).with_deceleration(max_deceleration);
            match (params.get(&key("min_position")), params.get(&key("max_position"))) {
                (Some(&min), Some(&max)) => limit = limit.with_position_bounds(min, max),
                (None, None) => {}
                (Some(_), None) => return Err(missing(&key("max_position"))),
                (None, Some(_)) => return Err(missing(&key("min_position"))),
            }
            container.add_joint_limit(joint, limit);
        }

        if params.keys().any(|k| k.starts_with(CARTESIAN_PREFIX)) {
            let cart_key = |field: &str| format!("{CARTESIAN_PREFIX}{field}");
            let max_trans_acc = required(params, &cart_key("max_trans_acc"))?;
            container.set_cartesian_limits(CartesianLimit {
                max_trans_vel: required(params, &cart_key("max_trans_vel"))?,
                max_trans_acc,
                max_trans_dec: params
                    .get(&cart_key("max_trans_dec"))
                    .map(|d| d.abs())
                    .unwrap_or(max_trans_acc),
                max_rot_vel: required(params, &cart_key("max_rot_vel"))?,
            });
        }

        Ok(container)
    }
}

fn required(params: &HashMap<String, f64>, key: &str) -> Result<f64, ConfigError> {
    params.get(key).copied().ok_or_else(|| missing(key))
}

fn missing(key: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name: key.to_string(),
        value: "missing".to_string(),
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveLimit {
            name: name.to_string(),
            value,
        })
    }
}
