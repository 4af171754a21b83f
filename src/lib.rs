pub mod common;
pub mod control;
pub mod error;
pub mod kinematics;
pub mod lifecycle;
pub mod limits;

pub use crate::common::{JointState, Pose};
pub use crate::control::trajectory::{
    CircConfig, CircTrajectoryGenerator, GenerationResult, JointTrajectory, TrajectoryGenerator,
    TrajectoryRequest,
};
pub use crate::control::PlanningStack;
pub use crate::error::{ConfigError, ErrorCode, GenerationError, KinematicsError, LifecycleError};
pub use crate::kinematics::{GantryKinematics, Kinematics};
pub use crate::limits::{CartesianLimit, JointLimit, LimitsContainer};

use crate::lifecycle::LifecycleNode;

/// Core functionality for the motion planning components
#[derive(Default)]
pub struct MotionCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl MotionCore {
    /// Create a new instance of MotionCore
    pub fn new() -> Self {
        MotionCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Configure and activate all registered components
    pub fn init(&mut self) -> Result<(), LifecycleError> {
        for component in &mut self.components {
            component.on_configure()?;
            component.on_activate()?;
        }
        Ok(())
    }

    /// Deactivate and clean up all registered components
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        for component in &mut self.components {
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        Ok(())
    }

    /// Get a mutable reference to the planning stack
    pub fn planning_stack_mut(&mut self) -> Option<&mut PlanningStack> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<PlanningStack>())
    }
}
