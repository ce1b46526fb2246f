//! Name-keyed collections of driving and ancillary data.
//!
//! Driving data vary in time and carry a time coordinate along their leading axis.
//! Ancillary data are time-invariant and have exactly the shape of the grid.

use crate::errors::{CouplingError, CouplingResult};
use crate::space::Grid;
use crate::time::TimeDomain;
use ndarray::{ArrayD, ArrayViewD, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A physical variable held in a [`DataSet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VariableRepr")]
pub struct Variable {
    units: String,
    array: ArrayD<f64>,
    time: Option<TimeDomain>,
    grid: Grid,
}

#[derive(Deserialize)]
struct VariableRepr {
    units: String,
    array: ArrayD<f64>,
    time: Option<TimeDomain>,
    grid: Grid,
}

impl TryFrom<VariableRepr> for Variable {
    type Error = CouplingError;

    fn try_from(repr: VariableRepr) -> CouplingResult<Self> {
        match repr.time {
            Some(time) => Self::driving(&repr.units, repr.array, time, repr.grid),
            None => Self::ancillary(&repr.units, repr.array, repr.grid),
        }
    }
}

impl Variable {
    /// A time-varying variable with dimensions `(time, [Z,] Y, X)`.
    pub fn driving(
        units: &str,
        array: ArrayD<f64>,
        time: TimeDomain,
        grid: Grid,
    ) -> CouplingResult<Self> {
        let mut expected = vec![time.len()];
        expected.extend(grid.shape());
        let mut truncated = vec![time.len() - 1];
        truncated.extend(grid.shape());
        if array.shape() != expected.as_slice() && array.shape() != truncated.as_slice() {
            return Err(CouplingError::InvalidDomain(format!(
                "an array of shape {:?} does not fit a time coordinate of {} timestamps on {grid}",
                array.shape(),
                time.len()
            )));
        }
        Ok(Self {
            units: units.to_string(),
            array,
            time: Some(time),
            grid,
        })
    }

    /// A time-invariant variable with dimensions `([Z,] Y, X)`.
    pub fn ancillary(units: &str, array: ArrayD<f64>, grid: Grid) -> CouplingResult<Self> {
        if array.shape() != grid.shape().as_slice() {
            return Err(CouplingError::InvalidDomain(format!(
                "an array of shape {:?} does not fit {grid}",
                array.shape()
            )));
        }
        Ok(Self {
            units: units.to_string(),
            array,
            time: None,
            grid,
        })
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn array(&self) -> &ArrayD<f64> {
        &self.array
    }

    /// The time coordinate, absent for ancillary variables.
    pub fn time(&self) -> Option<&TimeDomain> {
        self.time.as_ref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The values at timestep `index`, without copying.
    ///
    /// Ancillary variables return their whole array whatever the index.
    pub fn at_step(&self, index: usize) -> CouplingResult<ArrayViewD<'_, f64>> {
        match self.time {
            None => Ok(self.array.view()),
            Some(_) => {
                if index >= self.array.len_of(Axis(0)) {
                    return Err(CouplingError::Error(format!(
                        "timestep {index} is beyond the {} timesteps of the data",
                        self.array.len_of(Axis(0))
                    )));
                }
                Ok(self.array.index_axis(Axis(0), index))
            }
        }
    }
}

/// A collection of variables keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSet {
    variables: HashMap<String, Variable>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, variable: Variable) -> &mut Self {
        self.variables.insert(name.to_string(), variable);
        self
    }

    pub fn with_variable(mut self, name: &str, variable: Variable) -> Self {
        self.insert(name, variable);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
