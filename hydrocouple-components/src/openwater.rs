//! Open water component

use crate::state_mut;
use hydrocouple_core::component::{
    Component, ComponentKind, InitialStates, InitialisationContext, Inputs, Interface,
    RequirementDefinition, RequirementType,
};
use hydrocouple_core::errors::CouplingResult;
use hydrocouple_core::state::States;
use ndarray::Zip;
use serde::{Deserialize, Serialize};

const VAR_STORAGE: &str = "storage";
const RESIDENCE_TIME: &str = "residence_time";
const INITIAL_STORAGE: &str = "initial_storage";

/// Linear reservoir routing runoff to the outlet of each cell.
///
/// Storage gains runoff and loses open water evaporation, then releases the fraction
/// $\min(\Delta t / \tau, 1)$ of itself as discharge every step, $\tau$ being the
/// residence time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearReservoirOpenWater {}

impl LinearReservoirOpenWater {
    pub fn new() -> Self {
        Self {}
    }
}

#[typetag::serde]
impl Component for LinearReservoirOpenWater {
    fn kind(&self) -> ComponentKind {
        ComponentKind::OpenWater
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::new(RESIDENCE_TIME, "s", RequirementType::Parameter),
            RequirementDefinition::new(INITIAL_STORAGE, "kg m-2", RequirementType::Constant),
            RequirementDefinition::new(VAR_STORAGE, "kg m-2", RequirementType::State),
        ]
    }

    fn solver_history(&self) -> usize {
        2
    }

    fn initialise(&self, context: &InitialisationContext) -> CouplingResult<InitialStates> {
        let storage = context.constant(INITIAL_STORAGE, 0.0);
        Ok(InitialStates::from([(
            VAR_STORAGE.to_string(),
            context.filled_history(storage),
        )]))
    }

    fn run(&self, inputs: &Inputs, states: &mut States) -> CouplingResult<Interface> {
        let dt = inputs.timestep();
        let released = (dt / inputs.parameter(RESIDENCE_TIME)?).min(1.0);
        let runoff = inputs.get("runoff")?;
        let evaporation = inputs.get("evaporation_openwater")?;

        let storage = state_mut(states, VAR_STORAGE)?;
        let mut current = &storage[-1] + &((&runoff - &evaporation) * dt);
        let mut discharge = inputs.zeros();
        Zip::from(&mut current)
            .and(&mut discharge)
            .for_each(|storage, discharge| {
                *storage = (*storage).max(0.0);
                *discharge = *storage * released / dt;
                *storage -= *discharge * dt;
            });
        storage[0].assign(&current);

        Ok(Interface::from([("discharge".to_string(), discharge)]))
    }

    fn finalise(&self, _states: &States) -> CouplingResult<()> {
        Ok(())
    }
}
