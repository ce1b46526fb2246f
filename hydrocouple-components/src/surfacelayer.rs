//! Surface layer component
//!
//! Partitions precipitation between the canopy, the snowpack and the ground, and
//! splits a potential evaporation between the vegetated and bare fractions of each cell.

use crate::{state_mut, FREEZING_POINT};
use hydrocouple_core::component::{
    Component, ComponentKind, InitialStates, InitialisationContext, Inputs, Interface,
    RequirementDefinition, RequirementType,
};
use hydrocouple_core::errors::CouplingResult;
use hydrocouple_core::state::States;
use ndarray::{ArrayD, IxDyn, Zip};
use serde::{Deserialize, Serialize};

// Variable name constants
const VAR_RAINFALL: &str = "rainfall";
const VAR_SNOWFALL: &str = "snowfall";
const VAR_AIR_TEMPERATURE: &str = "air_temperature";
const VAR_VEGETATION_FRACTION: &str = "vegetation_fraction";
const VAR_SOIL_WATER_STRESS: &str = "soil_water_stress";
const VAR_SNOWPACK: &str = "snowpack";

const DEGREE_DAY_FACTOR: &str = "degree_day_factor";
const POTENTIAL_EVAPORATION: &str = "potential_evaporation";
const CANOPY_INTERCEPTION: &str = "canopy_interception";
const INITIAL_SNOWPACK: &str = "initial_snowpack";

/// Degree-day snow model with a single-parameter canopy.
///
/// With $T$ the air temperature, $\Delta t$ the timestep and $S$ the snowpack:
/// $$ M = \min\left(k_{dd} \max(T - T_f, 0), \frac{S_{t-1}}{\Delta t} + F_s\right) $$
/// $$ S_t = S_{t-1} + (F_s - M) \Delta t $$
///
/// Rainfall reaches the ground except for the share intercepted by the vegetated
/// fraction $v$ of the cell. Transpiration and soil evaporation take the potential
/// evaporation $E_p$ of the vegetated and bare fractions, limited by the soil water
/// stress $\beta$ of the subsurface:
/// $$ E_t = E_p v \beta \qquad E_s = E_p (1 - v) \beta $$
///
/// Open water evaporates at the potential rate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DegreeDaySurfaceLayer {}

impl DegreeDaySurfaceLayer {
    pub fn new() -> Self {
        Self {}
    }
}

#[typetag::serde]
impl Component for DegreeDaySurfaceLayer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SurfaceLayer
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::new(VAR_RAINFALL, "kg m-2 s-1", RequirementType::DrivingData),
            RequirementDefinition::new(VAR_SNOWFALL, "kg m-2 s-1", RequirementType::DrivingData),
            RequirementDefinition::new(VAR_AIR_TEMPERATURE, "K", RequirementType::DrivingData),
            RequirementDefinition::new(
                VAR_VEGETATION_FRACTION,
                "1",
                RequirementType::AncillaryData,
            ),
            RequirementDefinition::new(
                DEGREE_DAY_FACTOR,
                "kg m-2 s-1 K-1",
                RequirementType::Constant,
            ),
            RequirementDefinition::new(
                POTENTIAL_EVAPORATION,
                "kg m-2 s-1",
                RequirementType::Constant,
            ),
            RequirementDefinition::new(CANOPY_INTERCEPTION, "1", RequirementType::Constant),
            RequirementDefinition::new(INITIAL_SNOWPACK, "kg m-2", RequirementType::Constant),
            RequirementDefinition::new(VAR_SNOWPACK, "kg m-2", RequirementType::State),
        ]
    }

    fn solver_history(&self) -> usize {
        2
    }

    fn initialise(&self, context: &InitialisationContext) -> CouplingResult<InitialStates> {
        let snowpack = context.constant(INITIAL_SNOWPACK, 0.0);
        Ok(InitialStates::from([(
            VAR_SNOWPACK.to_string(),
            context.filled_history(snowpack),
        )]))
    }

    fn run(&self, inputs: &Inputs, states: &mut States) -> CouplingResult<Interface> {
        let dt = inputs.timestep();
        let rainfall = inputs.get(VAR_RAINFALL)?;
        let snowfall = inputs.get(VAR_SNOWFALL)?;
        let air_temperature = inputs.get(VAR_AIR_TEMPERATURE)?;
        let vegetation = inputs.get(VAR_VEGETATION_FRACTION)?;
        let stress = inputs.get(VAR_SOIL_WATER_STRESS)?;

        let degree_day_factor = inputs.constant(DEGREE_DAY_FACTOR, 4e-5);
        let potential_evaporation = inputs.constant(POTENTIAL_EVAPORATION, 3e-5);
        let canopy_interception = inputs.constant(CANOPY_INTERCEPTION, 0.2);

        let snowpack = state_mut(states, VAR_SNOWPACK)?;
        let mut snowmelt = inputs.zeros();
        Zip::from(&mut snowmelt)
            .and(&air_temperature)
            .and(&snowfall)
            .and(&snowpack[-1])
            .for_each(|melt, &temperature, &fall, &pack| {
                let potential = (temperature - FREEZING_POINT).max(0.0) * degree_day_factor;
                *melt = potential.min(pack / dt + fall);
            });
        let accumulated = &snowpack[-1] + &((&snowfall - &snowmelt) * dt);
        snowpack[0].assign(&accumulated);

        let throughfall = &rainfall * &vegetation.mapv(|v| 1.0 - canopy_interception * v);
        let transpiration = &(&vegetation * &stress) * potential_evaporation;
        let evaporation_soil_surface =
            &vegetation.mapv(|v| (1.0 - v) * potential_evaporation) * &stress;

        Ok(Interface::from([
            ("throughfall".to_string(), throughfall),
            ("snowmelt".to_string(), snowmelt),
            ("transpiration".to_string(), transpiration),
            (
                "evaporation_soil_surface".to_string(),
                evaporation_soil_surface,
            ),
            ("evaporation_ponded_water".to_string(), inputs.zeros()),
            (
                "evaporation_openwater".to_string(),
                ArrayD::from_elem(IxDyn(inputs.shape()), potential_evaporation),
            ),
        ]))
    }

    fn finalise(&self, _states: &States) -> CouplingResult<()> {
        Ok(())
    }
}
