//! The contract every component of the coupled system satisfies.
//!
//! A component fills one [`Category`] of the water cycle and exchanges the fixed set of
//! inwards and outwards of that category with the two other components through the
//! interface. Everything else it needs (driving and ancillary data, parameters,
//! constants and states) is declared through [`Component::definitions`] and supplied by
//! the model.

mod category;
mod inputs;

pub use category::{Category, ComponentKind, Transfer};
pub use inputs::{InitialisationContext, Inputs};

use crate::errors::CouplingResult;
use crate::state::States;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// Values keyed by variable name, shared between components for one simulation.
pub type Interface = HashMap<String, ArrayD<f64>>;

/// Initial history of each state, oldest snapshot first.
pub type InitialStates = HashMap<String, Vec<ArrayD<f64>>>;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum RequirementType {
    /// Time-varying data read from the dataset at every step
    DrivingData,
    /// Time-invariant data read from the dataset
    AncillaryData,
    /// A mandatory scalar supplied when the component is bound
    Parameter,
    /// An optional scalar with a default chosen by the component
    Constant,
    /// A rolling state created by `initialise`
    State,
}

#[derive(Debug, Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub name: String,
    pub unit: String,
    pub requirement_type: RequirementType,
}

impl RequirementDefinition {
    pub fn new(name: &str, unit: &str, requirement_type: RequirementType) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            requirement_type,
        }
    }
}

/// Names of the definitions of a given type.
pub fn names_of(definitions: &[RequirementDefinition], kind: RequirementType) -> Vec<&str> {
    definitions
        .iter()
        .filter(|d| d.requirement_type == kind)
        .map(|d| d.name.as_str())
        .collect()
}

/// Component of the coupled model.
///
/// The inwards and outwards of a component are those of its [`ComponentKind`]; a
/// component only declares what it needs beyond them.
#[typetag::serde(tag = "type")]
pub trait Component: Debug + Send + Sync {
    fn kind(&self) -> ComponentKind;

    /// Driving data, ancillary data, parameters, constants and states of the component.
    fn definitions(&self) -> Vec<RequirementDefinition>;

    /// Number of snapshots kept for each state, including the current one.
    fn solver_history(&self) -> usize {
        1
    }

    /// Create the initial history of every declared state.
    ///
    /// Each history holds [`Component::solver_history`] snapshots, oldest first.
    fn initialise(&self, context: &InitialisationContext) -> CouplingResult<InitialStates>;

    /// Advance the component by one of its timesteps.
    ///
    /// Index 0 of each state is the snapshot of the current step and is written by the
    /// component; it starts from zero on every step but the first. Returns a value for
    /// every outward of the component.
    fn run(&self, inputs: &Inputs, states: &mut States) -> CouplingResult<Interface>;

    /// Called once after the last timestep with the final states.
    fn finalise(&self, states: &States) -> CouplingResult<()>;
}
