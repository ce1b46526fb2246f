//! Tests of binding, wiring and simulating models.
//!
//! The fixtures use a single test component able to fill any category. It reads a
//! `forcing` driving variable and a `fraction` ancillary variable, writes
//! `factor * forcing` to every outward and accumulates `forcing * dt` in its `store`
//! state.

use crate::component::{
    Category, Component, ComponentKind, InitialStates, InitialisationContext, Inputs, Interface,
    RequirementDefinition, RequirementType,
};
use crate::data::{DataSet, Variable};
use crate::errors::{CouplingError, CouplingResult};
use crate::model::ModelComponent;
use crate::space::{Grid, GridLocation, SpaceDomain};
use crate::state::States;
use crate::time::{Calendar, TimeDomain};
use ndarray::{Array, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(test)]
mod basic;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct TestComponent {
    pub category: Category,
    /// Leave `store` out of the initial states.
    #[serde(default)]
    pub forget_state: bool,
    /// Leave the first outward out of the results of `run`.
    #[serde(default)]
    pub drop_outward: bool,
}

impl TestComponent {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            forget_state: false,
            drop_outward: false,
        }
    }
}

#[typetag::serde]
impl Component for TestComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::from(self.category)
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::new("forcing", "kg m-2 s-1", RequirementType::DrivingData),
            RequirementDefinition::new("fraction", "1", RequirementType::AncillaryData),
            RequirementDefinition::new("factor", "1", RequirementType::Parameter),
            RequirementDefinition::new("delay", "s", RequirementType::Parameter),
            RequirementDefinition::new("initial_store", "kg m-2", RequirementType::Constant),
            RequirementDefinition::new("store", "kg m-2", RequirementType::State),
        ]
    }

    fn solver_history(&self) -> usize {
        2
    }

    fn initialise(&self, context: &InitialisationContext) -> CouplingResult<InitialStates> {
        let mut states = InitialStates::new();
        if !self.forget_state {
            let initial = context.constant("initial_store", 0.0);
            states.insert("store".to_string(), context.filled_history(initial));
        }
        Ok(states)
    }

    fn run(&self, inputs: &Inputs, states: &mut States) -> CouplingResult<Interface> {
        let forcing = inputs.get("forcing")?;
        let factor = inputs.parameter("factor")?;
        for inward in self.category.inwards() {
            inputs.get(inward.name)?;
        }

        let store = states.get_mut("store").ok_or_else(|| CouplingError::MissingState {
            state: "store".to_string(),
            category: self.category.to_string(),
            component: "TestComponent".to_string(),
        })?;
        let accumulated = &store[-1] + &(&forcing * inputs.timestep());
        store[0].assign(&accumulated);

        let skip = usize::from(self.drop_outward);
        Ok(self
            .category
            .outwards()
            .iter()
            .skip(skip)
            .map(|t| (t.name.to_string(), &forcing * factor))
            .collect())
    }

    fn finalise(&self, _states: &States) -> CouplingResult<()> {
        Ok(())
    }
}

pub(super) fn grid() -> Grid {
    Grid::from_extent_and_resolution((0.0, 2.0), (0.0, 3.0), 1.0, 1.0, GridLocation::Centre)
        .unwrap()
}

/// A daily domain over `0..=last` days, every `every` days.
pub(super) fn days(last: i32, every: i32) -> TimeDomain {
    let values: Vec<i32> = (0..=last).step_by(every as usize).collect();
    TimeDomain::new(&values, "days since 2019-01-01", Calendar::Gregorian).unwrap()
}

/// Values equal to the index of the step, without the trailing timestamp.
pub(super) fn step_indices(time: &TimeDomain, grid: &Grid) -> ArrayD<f64> {
    let mut shape = vec![time.steps()];
    shape.extend(grid.shape());
    Array::from_shape_fn(IxDyn(&shape), |idx| idx[0] as f64)
}

pub(super) fn dataset(time: &TimeDomain, forcing_units: &str) -> DataSet {
    let grid = grid();
    DataSet::new()
        .with_variable(
            "forcing",
            Variable::driving(forcing_units, step_indices(time, &grid), time.clone(), grid.clone())
                .unwrap(),
        )
        .with_variable(
            "fraction",
            Variable::ancillary("1", ArrayD::from_elem(IxDyn(&grid.shape()), 0.5), grid).unwrap(),
        )
}

pub(super) fn parameters() -> HashMap<String, f64> {
    HashMap::from([("factor".to_string(), 2.0), ("delay".to_string(), 1.0)])
}

pub(super) fn bind(component: TestComponent, time: TimeDomain) -> CouplingResult<ModelComponent> {
    let dataset = dataset(&time, "kg m-2 s-1");
    ModelComponent::new(
        Arc::new(component),
        time,
        SpaceDomain::Grid(grid()),
        dataset,
        parameters(),
        HashMap::new(),
    )
}

pub(super) fn test_component(category: Category, time: TimeDomain) -> ModelComponent {
    bind(TestComponent::new(category), time).unwrap()
}
