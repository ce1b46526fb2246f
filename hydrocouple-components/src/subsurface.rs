//! Subsurface component
//!
//! A single soil bucket filled by throughfall and snowmelt, emptied by evaporation,
//! transpiration and gravity drainage.

use crate::{state_mut, FREEZING_POINT};
use hydrocouple_core::component::{
    Component, ComponentKind, InitialStates, InitialisationContext, Inputs, Interface,
    RequirementDefinition, RequirementType,
};
use hydrocouple_core::errors::CouplingResult;
use hydrocouple_core::state::States;
use ndarray::Zip;
use serde::{Deserialize, Serialize};

const VAR_SOIL_TEMPERATURE: &str = "soil_temperature";
const VAR_SOIL_MOISTURE: &str = "soil_moisture";

const SATURATED_HYDRAULIC_CONDUCTIVITY: &str = "saturated_hydraulic_conductivity";
const SOIL_CAPACITY: &str = "soil_capacity";
const INITIAL_SOIL_MOISTURE: &str = "initial_soil_moisture";

/// Bucket soil model.
///
/// Water reaching the ground fills the bucket and evaporative losses empty it. The
/// bucket drains at $K_s \theta / \theta_{max}$ unless the soil is frozen, and
/// everything above the capacity $\theta_{max}$ runs off immediately. Runoff is the sum
/// of saturation excess and drainage.
///
/// The soil water stress handed back to the surface layer is $\theta / \theta_{max}$.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketSubSurface {}

impl BucketSubSurface {
    pub fn new() -> Self {
        Self {}
    }
}

#[typetag::serde]
impl Component for BucketSubSurface {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SubSurface
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::new(VAR_SOIL_TEMPERATURE, "K", RequirementType::DrivingData),
            RequirementDefinition::new(
                SATURATED_HYDRAULIC_CONDUCTIVITY,
                "kg m-2 s-1",
                RequirementType::Parameter,
            ),
            RequirementDefinition::new(SOIL_CAPACITY, "kg m-2", RequirementType::Constant),
            RequirementDefinition::new(INITIAL_SOIL_MOISTURE, "kg m-2", RequirementType::Constant),
            RequirementDefinition::new(VAR_SOIL_MOISTURE, "kg m-2", RequirementType::State),
        ]
    }

    fn solver_history(&self) -> usize {
        2
    }

    fn initialise(&self, context: &InitialisationContext) -> CouplingResult<InitialStates> {
        let moisture = context.constant(INITIAL_SOIL_MOISTURE, 50.0);
        Ok(InitialStates::from([(
            VAR_SOIL_MOISTURE.to_string(),
            context.filled_history(moisture),
        )]))
    }

    fn run(&self, inputs: &Inputs, states: &mut States) -> CouplingResult<Interface> {
        let dt = inputs.timestep();
        let conductivity = inputs.parameter(SATURATED_HYDRAULIC_CONDUCTIVITY)?;
        let capacity = inputs.constant(SOIL_CAPACITY, 100.0);
        let soil_temperature = inputs.get(VAR_SOIL_TEMPERATURE)?;

        let infiltration = &inputs.get("throughfall")? + &inputs.get("snowmelt")?;
        let losses = &(&inputs.get("evaporation_soil_surface")?
            + &inputs.get("evaporation_ponded_water")?)
            + &inputs.get("transpiration")?;

        let soil_moisture = state_mut(states, VAR_SOIL_MOISTURE)?;
        let mut moisture = &soil_moisture[-1] + &((&infiltration - &losses) * dt);
        let mut runoff = inputs.zeros();
        let mut stress = inputs.zeros();
        Zip::from(&mut moisture)
            .and(&mut runoff)
            .and(&mut stress)
            .and(&soil_temperature)
            .for_each(|theta, runoff, stress, &temperature| {
                *theta = (*theta).max(0.0);
                let drainage = if temperature > FREEZING_POINT {
                    (conductivity * *theta / capacity).min(*theta / dt)
                } else {
                    0.0
                };
                *theta -= drainage * dt;
                let excess = (*theta - capacity).max(0.0);
                *theta -= excess;
                *runoff = excess / dt + drainage;
                *stress = *theta / capacity;
            });
        soil_moisture[0].assign(&moisture);

        Ok(Interface::from([
            ("runoff".to_string(), runoff),
            ("soil_water_stress".to_string(), stress),
        ]))
    }

    fn finalise(&self, _states: &States) -> CouplingResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{field, initial_states, inputs, HOUR};
    use approx::assert_relative_eq;
    use hydrocouple_core::component::Category;
    use ndarray::ArrayD;
    use std::collections::HashMap;

    fn interface(throughfall: f64, transpiration: f64) -> Interface {
        Interface::from([
            ("throughfall".to_string(), field(throughfall)),
            ("snowmelt".to_string(), field(0.0)),
            ("transpiration".to_string(), field(transpiration)),
            ("evaporation_soil_surface".to_string(), field(0.0)),
            ("evaporation_ponded_water".to_string(), field(0.0)),
        ])
    }

    fn step(
        interface: &Interface,
        soil_temperature: &ArrayD<f64>,
        constants: &HashMap<String, f64>,
        states: &mut States,
    ) -> Interface {
        let parameters = HashMap::from([(SATURATED_HYDRAULIC_CONDUCTIVITY.to_string(), 1e-3)]);
        let inputs = inputs(Category::SubSurface, interface, &parameters, constants)
            .with_driving(VAR_SOIL_TEMPERATURE, soil_temperature.view());
        BucketSubSurface::new().run(&inputs, states).unwrap()
    }

    #[test]
    fn test_drainage() {
        let constants = HashMap::new();
        let mut states = initial_states(&BucketSubSurface::new(), &constants);
        let outwards = step(&interface(0.0, 0.0), &field(280.0), &constants, &mut states);

        // 1e-3 * 50 / 100
        assert_relative_eq!(outwards["runoff"][[0, 0]], 5e-4, max_relative = 1e-12);
        assert_relative_eq!(
            states[VAR_SOIL_MOISTURE][0][[0, 0]],
            50.0 - 5e-4 * HOUR,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            outwards["soil_water_stress"][[0, 1]],
            (50.0 - 5e-4 * HOUR) / 100.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_frozen_soil_does_not_drain() {
        let constants = HashMap::new();
        let mut states = initial_states(&BucketSubSurface::new(), &constants);
        let outwards = step(&interface(0.0, 1e-3), &field(260.0), &constants, &mut states);

        assert_eq!(outwards["runoff"][[0, 0]], 0.0);
        assert_relative_eq!(
            states[VAR_SOIL_MOISTURE][0][[0, 0]],
            50.0 - 1e-3 * HOUR,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_saturation_excess() {
        let constants = HashMap::from([(INITIAL_SOIL_MOISTURE.to_string(), 100.0)]);
        let mut states = initial_states(&BucketSubSurface::new(), &constants);
        let outwards = step(&interface(1e-2, 0.0), &field(260.0), &constants, &mut states);

        // 36 kg m-2 above capacity leave within the hour
        assert_relative_eq!(outwards["runoff"][[0, 0]], 1e-2, max_relative = 1e-12);
        assert_relative_eq!(outwards["soil_water_stress"][[0, 0]], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_moisture_carries_over() {
        let constants = HashMap::new();
        let mut states = initial_states(&BucketSubSurface::new(), &constants);
        step(&interface(1e-3, 0.0), &field(260.0), &constants, &mut states);
        states.values_mut().for_each(|state| state.advance());
        step(&interface(1e-3, 0.0), &field(260.0), &constants, &mut states);

        assert_relative_eq!(
            states[VAR_SOIL_MOISTURE][-1][[0, 0]],
            50.0 + 1e-3 * HOUR,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            states[VAR_SOIL_MOISTURE][0][[0, 0]],
            50.0 + 2e-3 * HOUR,
            max_relative = 1e-12
        );
    }
}
