//! Lifecycle management for motion planning components

use std::any::Any;
use std::fmt;

use tracing::info;

use crate::error::LifecycleError;

/// Trait for components that follow a lifecycle pattern
pub trait LifecycleNode: Send + Sync {
    /// Configure the node
    fn on_configure(&mut self) -> Result<(), LifecycleError>;

    /// Activate the node
    fn on_activate(&mut self) -> Result<(), LifecycleError>;

    /// Deactivate the node
    fn on_deactivate(&mut self) -> Result<(), LifecycleError>;

    /// Clean up the node
    fn on_cleanup(&mut self) -> Result<(), LifecycleError>;

    /// Convert to Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// State of a lifecycle node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Unconfigured => "unconfigured",
            State::Inactive => "inactive",
            State::Active => "active",
        };
        f.write_str(name)
    }
}

/// Base implementation for lifecycle nodes
#[derive(Debug, Clone)]
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

impl LifecycleNodeBase {
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    pub fn get_state(&self) -> State {
        self.state
    }

    /// Fail unless the node is currently in `expected`
    pub fn require(&self, expected: State, target: State) -> Result<(), LifecycleError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                name: self.name.clone(),
                from: self.state.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Move from `from` to `to`, rejecting any other starting state
    pub fn transition(&mut self, from: State, to: State) -> Result<(), LifecycleError> {
        self.require(from, to)?;
        info!(node = %self.name, %from, %to, "lifecycle transition");
        self.state = to;
        Ok(())
    }
}
