//! A component bound to the domains, data and settings it runs with.

use crate::component::{
    names_of, Category, ComponentKind, InitialisationContext, Inputs, Interface,
    RequirementDefinition, RequirementType,
};
use crate::data::DataSet;
use crate::errors::{CouplingError, CouplingResult};
use crate::space::{Grid, SpaceDomain};
use crate::state::{RollingState, States};
use crate::time::TimeDomain;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::substitutes::{DataComponent, NullComponent};
use super::types::C;
use super::validation::{verify_dataset, verify_parameters, verify_space, Origin};

/// A component together with everything it needs to run.
///
/// All checks against the domains, the dataset and the parameters happen in the
/// constructors; a `ModelComponent` that exists is ready to be wired into a model.
///
/// Deserialising goes through [`ModelComponent::new`] again, and the rolling states are
/// neither written nor read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ModelComponentRepr")]
pub struct ModelComponent {
    name: String,
    component: C,
    time: TimeDomain,
    grid: Grid,
    dataset: DataSet,
    parameters: HashMap<String, f64>,
    constants: HashMap<String, f64>,
    #[serde(skip)]
    states: States,
}

#[derive(Deserialize)]
struct ModelComponentRepr {
    component: C,
    time: TimeDomain,
    grid: Grid,
    #[serde(default)]
    dataset: DataSet,
    #[serde(default)]
    parameters: HashMap<String, f64>,
    #[serde(default)]
    constants: HashMap<String, f64>,
}

impl TryFrom<ModelComponentRepr> for ModelComponent {
    type Error = CouplingError;

    fn try_from(repr: ModelComponentRepr) -> CouplingResult<Self> {
        Self::new(
            repr.component,
            repr.time,
            SpaceDomain::Grid(repr.grid),
            repr.dataset,
            repr.parameters,
            repr.constants,
        )
    }
}

/// Name of the concrete type behind a component, taken from its `Debug` output.
fn component_name(component: &C) -> String {
    let debug = format!("{component:?}");
    debug
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default()
        .to_string()
}

impl ModelComponent {
    pub fn new(
        component: C,
        time: TimeDomain,
        space: SpaceDomain,
        dataset: DataSet,
        parameters: HashMap<String, f64>,
        constants: HashMap<String, f64>,
    ) -> CouplingResult<Self> {
        let name = component_name(&component);
        let origin = Origin {
            category: component.kind().category(),
            component: &name,
        };
        let grid = verify_space(space, &origin)?;
        let definitions = component.definitions();
        verify_dataset(&definitions, &dataset, &time, &grid, &origin)?;
        verify_parameters(&definitions, &parameters, &origin)?;

        Ok(Self {
            name,
            component,
            time,
            grid,
            dataset,
            parameters,
            constants,
            states: States::new(),
        })
    }

    /// Replay the outwards of `category` from `dataset`.
    pub fn data_substitute(
        category: Category,
        time: TimeDomain,
        space: SpaceDomain,
        dataset: DataSet,
    ) -> CouplingResult<Self> {
        Self::new(
            Arc::new(DataComponent::new(category)),
            time,
            space,
            dataset,
            HashMap::new(),
            HashMap::new(),
        )
    }

    /// Produce zeros for the outwards of `category`.
    pub fn null_substitute(
        category: Category,
        time: TimeDomain,
        space: SpaceDomain,
    ) -> CouplingResult<Self> {
        Self::new(
            Arc::new(NullComponent::new(category)),
            time,
            space,
            DataSet::new(),
            HashMap::new(),
            HashMap::new(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ComponentKind {
        self.component.kind()
    }

    pub fn category(&self) -> Category {
        self.kind().category()
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn time(&self) -> &TimeDomain {
        &self.time
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    pub fn parameters(&self) -> &HashMap<String, f64> {
        &self.parameters
    }

    pub fn constants(&self) -> &HashMap<String, f64> {
        &self.constants
    }

    /// Rolling states, empty until the component has been initialised.
    pub fn states(&self) -> &States {
        &self.states
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        self.component.definitions()
    }

    /// Create the rolling states of the component.
    ///
    /// Returns the current snapshot of every state, keyed by state name.
    pub(crate) fn initialise_states(&mut self) -> CouplingResult<Interface> {
        let shape = self.grid.shape();
        let history = self.component.solver_history();
        let context = InitialisationContext::new(&self.constants, &shape, history);
        let mut initial = self.component.initialise(&context)?;

        let definitions = self.definitions();
        let mut states = States::new();
        let mut current = Interface::new();
        for name in names_of(&definitions, RequirementType::State) {
            let snapshots = initial
                .remove(name)
                .ok_or_else(|| CouplingError::MissingState {
                    state: name.to_string(),
                    category: self.category().to_string(),
                    component: self.name.clone(),
                })?;
            if snapshots.len() != history {
                return Err(CouplingError::InvalidState(format!(
                    "{} ({}) initialised '{name}' with {} snapshot(s) instead of {history}",
                    self.name,
                    self.category(),
                    snapshots.len()
                )));
            }
            if snapshots.iter().any(|s| s.shape() != shape.as_slice()) {
                return Err(CouplingError::InvalidState(format!(
                    "{} ({}) initialised '{name}' with snapshots not of shape {shape:?}",
                    self.name,
                    self.category()
                )));
            }
            let state = RollingState::new(snapshots)?;
            current.insert(name.to_string(), state.current().clone());
            states.insert(name.to_string(), state);
        }
        if !initial.is_empty() {
            let undeclared: Vec<&String> = initial.keys().collect();
            warn!(
                component = %self.name,
                category = %self.category(),
                ?undeclared,
                "ignoring initial values of undeclared states"
            );
        }

        self.states = states;
        Ok(current)
    }

    /// Run the `step`-th timestep of the component's own temporal domain.
    pub(crate) fn run_step(
        &mut self,
        step: usize,
        interface: &Interface,
    ) -> CouplingResult<Interface> {
        let definitions = self.definitions();
        let shape = self.grid.shape();
        let kind = self.component.kind();

        let mut inputs = Inputs::new(
            self.time.datetime_at(step)?,
            self.time.timestep_seconds() as f64,
            interface,
            kind.inwards(),
            &self.parameters,
            &self.constants,
            &shape,
        );
        for definition in &definitions {
            let is_driving = match definition.requirement_type {
                RequirementType::DrivingData => true,
                RequirementType::AncillaryData => false,
                _ => continue,
            };
            let variable =
                self.dataset
                    .get(&definition.name)
                    .ok_or_else(|| CouplingError::MissingData {
                        variable: definition.name.clone(),
                        category: kind.category().to_string(),
                        component: self.name.clone(),
                    })?;
            inputs = if is_driving {
                inputs.with_driving(&definition.name, variable.at_step(step)?)
            } else {
                inputs.with_ancillary(&definition.name, variable.array().view())
            };
        }
        let mut outwards = self.component.run(&inputs, &mut self.states)?;

        for transfer in kind.outwards() {
            if !outwards.contains_key(transfer.name) {
                return Err(CouplingError::MissingTransfer {
                    transfer: transfer.name.to_string(),
                    category: kind.category().to_string(),
                    component: self.name.clone(),
                });
            }
        }
        outwards.retain(|name, _| kind.outwards().iter().any(|t| t.name == name));
        Ok(outwards)
    }

    /// Shift every rolling state one step into the past.
    pub(crate) fn increment_states(&mut self) {
        for state in self.states.values_mut() {
            state.advance();
        }
    }

    pub(crate) fn finalise_states(&self) -> CouplingResult<()> {
        self.component.finalise(&self.states)
    }
}
