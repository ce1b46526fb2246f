use super::{Interface, Transfer};
use crate::errors::{CouplingError, CouplingResult};
use crate::time::CalendarDateTime;
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use std::collections::HashMap;

/// What a component receives when asked to create its initial states.
#[derive(Debug)]
pub struct InitialisationContext<'a> {
    constants: &'a HashMap<String, f64>,
    shape: &'a [usize],
    solver_history: usize,
}

impl<'a> InitialisationContext<'a> {
    pub fn new(
        constants: &'a HashMap<String, f64>,
        shape: &'a [usize],
        solver_history: usize,
    ) -> Self {
        Self {
            constants,
            shape,
            solver_history,
        }
    }

    /// Shape of one snapshot, the shape of the spatial domain.
    pub fn shape(&self) -> &[usize] {
        self.shape
    }

    pub fn solver_history(&self) -> usize {
        self.solver_history
    }

    pub fn constant(&self, name: &str, default: f64) -> f64 {
        self.constants.get(name).copied().unwrap_or(default)
    }

    /// A full history in which every snapshot holds `value`.
    pub fn filled_history(&self, value: f64) -> Vec<ArrayD<f64>> {
        (0..self.solver_history)
            .map(|_| ArrayD::from_elem(IxDyn(self.shape), value))
            .collect()
    }
}

/// Everything a component can read during one of its timesteps.
///
/// Values are looked up by name in the driving data slice of the step, then the
/// ancillary data, then the inwards of the component in the interface.
#[derive(Debug)]
pub struct Inputs<'a> {
    datetime: CalendarDateTime,
    timestep: f64,
    driving: HashMap<&'a str, ArrayViewD<'a, f64>>,
    ancillary: HashMap<&'a str, ArrayViewD<'a, f64>>,
    interface: &'a Interface,
    inwards: &'static [Transfer],
    parameters: &'a HashMap<String, f64>,
    constants: &'a HashMap<String, f64>,
    shape: &'a [usize],
}

impl<'a> Inputs<'a> {
    /// Inputs without any driving or ancillary data.
    pub fn new(
        datetime: CalendarDateTime,
        timestep: f64,
        interface: &'a Interface,
        inwards: &'static [Transfer],
        parameters: &'a HashMap<String, f64>,
        constants: &'a HashMap<String, f64>,
        shape: &'a [usize],
    ) -> Self {
        Self {
            datetime,
            timestep,
            driving: HashMap::new(),
            ancillary: HashMap::new(),
            interface,
            inwards,
            parameters,
            constants,
            shape,
        }
    }

    /// Add the values of a driving variable for the current timestep.
    pub fn with_driving(mut self, name: &'a str, values: ArrayViewD<'a, f64>) -> Self {
        self.driving.insert(name, values);
        self
    }

    pub fn with_ancillary(mut self, name: &'a str, values: ArrayViewD<'a, f64>) -> Self {
        self.ancillary.insert(name, values);
        self
    }

    /// Start of the current timestep.
    pub fn datetime(&self) -> CalendarDateTime {
        self.datetime
    }

    /// Length of the timestep of the component, in seconds.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Shape of the spatial domain.
    pub fn shape(&self) -> &[usize] {
        self.shape
    }

    pub fn get(&self, name: &str) -> CouplingResult<ArrayViewD<'a, f64>> {
        if let Some(view) = self.driving.get(name).or_else(|| self.ancillary.get(name)) {
            return Ok(view.clone());
        }
        if self.inwards.iter().any(|t| t.name == name) {
            if let Some(array) = self.interface.get(name) {
                return Ok(array.view());
            }
        }
        Err(CouplingError::MissingVariable(name.to_string()))
    }

    pub fn parameter(&self, name: &str) -> CouplingResult<f64> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| CouplingError::MissingVariable(name.to_string()))
    }

    pub fn constant(&self, name: &str, default: f64) -> f64 {
        self.constants.get(name).copied().unwrap_or(default)
    }

    /// A zero-filled array of the shape of the spatial domain.
    pub fn zeros(&self) -> ArrayD<f64> {
        ArrayD::zeros(IxDyn(self.shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Category;

    #[test]
    fn test_lookup_order_and_declared_inwards() {
        let driving_values = ArrayD::from_elem(IxDyn(&[2]), 1.0);
        let shadowed = ArrayD::from_elem(IxDyn(&[2]), 9.0);
        let interface: Interface = HashMap::from([
            ("soil_water_stress".to_string(), ArrayD::from_elem(IxDyn(&[2]), 0.5)),
            ("rainfall".to_string(), shadowed),
            ("runoff".to_string(), ArrayD::from_elem(IxDyn(&[2]), 3.0)),
        ]);
        let parameters = HashMap::from([("k".to_string(), 2.0)]);
        let constants = HashMap::new();
        let inputs = Inputs::new(
            CalendarDateTime::date(2019, 1, 1),
            3600.0,
            &interface,
            Category::SurfaceLayer.inwards(),
            &parameters,
            &constants,
            &[2],
        )
        .with_driving("rainfall", driving_values.view());

        assert_eq!(inputs.get("rainfall").unwrap()[[0]], 1.0);
        assert_eq!(inputs.get("soil_water_stress").unwrap()[[1]], 0.5);
        // Present in the interface but not an inward of the surface layer
        assert!(matches!(
            inputs.get("runoff"),
            Err(CouplingError::MissingVariable(_))
        ));
        assert_eq!(inputs.parameter("k").unwrap(), 2.0);
        assert!(inputs.parameter("missing").is_err());
        assert_eq!(inputs.constant("missing", 4.0), 4.0);
        assert_eq!(inputs.zeros().shape(), &[2]);
    }

    #[test]
    fn test_filled_history() {
        let constants = HashMap::from([("initial".to_string(), 2.0)]);
        let context = InitialisationContext::new(&constants, &[2, 3], 2);
        let history = context.filled_history(context.constant("initial", 0.0));
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|s| s.shape() == [2, 3]));
        assert!(history[0].iter().all(|v| *v == 2.0));
    }
}
