//! Control module hosting the motion planners
pub mod trajectory;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use self::trajectory::{
    CircConfig, CircTrajectoryGenerator, GenerationResult, TrajectoryGenerator, TrajectoryRequest,
};
use crate::error::LifecycleError;
use crate::kinematics::Kinematics;
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::limits::LimitsContainer;

/// Planning stack for the manipulator.
///
/// Parameters are collected while unconfigured; the generator is only
/// built on configure and dropped again on cleanup.
pub struct PlanningStack {
    base: LifecycleNodeBase,
    kinematics: Arc<dyn Kinematics>,
    params: HashMap<String, f64>,
    generator: Option<CircTrajectoryGenerator>,
}

impl PlanningStack {
    /// Create a new planning stack for a kinematic model
    pub fn new(kinematics: Arc<dyn Kinematics>) -> Self {
        PlanningStack {
            base: LifecycleNodeBase::new("planning_stack"),
            kinematics,
            params: HashMap::new(),
            generator: None,
        }
    }

    /// Merge limit and generator parameters, applied on the next configure
    pub fn configure(&mut self, params: &HashMap<String, f64>) {
        self.params
            .extend(params.iter().map(|(k, v)| (k.clone(), *v)));
    }

    pub fn state(&self) -> State {
        self.base.get_state()
    }

    /// The generator, available once configured
    pub fn generator(&self) -> Option<&CircTrajectoryGenerator> {
        self.generator.as_ref()
    }

    /// Plan a circular motion. Only allowed while active.
    pub fn plan(&self, request: &TrajectoryRequest) -> Result<GenerationResult, LifecycleError> {
        match (&self.generator, self.base.get_state()) {
            (Some(generator), State::Active) => Ok(generator.generate(request)),
            _ => Err(LifecycleError::NotActive {
                name: self.base.name.clone(),
            }),
        }
    }
}

impl LifecycleNode for PlanningStack {
    fn on_configure(&mut self) -> Result<(), LifecycleError> {
        self.base.require(State::Unconfigured, State::Inactive)?;

        let joints = self.kinematics.active_joint_names();
        let limits = LimitsContainer::from_params(&self.params, joints)?;
        let config = CircConfig::from_params(&self.params)?;
        let generator = CircTrajectoryGenerator::new(Arc::clone(&self.kinematics), limits, config)?;
        info!(
            joints = self.kinematics.dof(),
            sampling_time = config.sampling_time,
            "circular generator ready"
        );

        self.generator = Some(generator);
        self.base.transition(State::Unconfigured, State::Inactive)
    }

    fn on_activate(&mut self) -> Result<(), LifecycleError> {
        self.base.transition(State::Inactive, State::Active)
    }

    fn on_deactivate(&mut self) -> Result<(), LifecycleError> {
        self.base.transition(State::Active, State::Inactive)
    }

    fn on_cleanup(&mut self) -> Result<(), LifecycleError> {
        self.base.transition(State::Inactive, State::Unconfigured)?;
        self.generator = None;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
