//! Checks run when a component is bound to its domains and data.
//!
//! Every check fails fast with an error naming the category, the component and the
//! offending variable or parameter.

use crate::component::{names_of, Category, RequirementDefinition, RequirementType};
use crate::data::DataSet;
use crate::errors::{CouplingError, CouplingResult};
use crate::space::{Grid, SpaceDomain};
use crate::time::TimeDomain;
use crate::units::units_equal;
use std::collections::HashMap;

/// Where an error was found.
pub(crate) struct Origin<'a> {
    pub category: Category,
    pub component: &'a str,
}

impl Origin<'_> {
    fn domain_error(&self, reason: String) -> CouplingError {
        CouplingError::DomainIncompatible {
            category: self.category.to_string(),
            component: self.component.to_string(),
            reason,
        }
    }
}

/// Only regular grids are supported.
pub(crate) fn verify_space(space: SpaceDomain, origin: &Origin) -> CouplingResult<Grid> {
    match space {
        SpaceDomain::Grid(grid) => Ok(grid),
        other => Err(CouplingError::NotSupported(format!(
            "{} ({}) was given a spatial domain of type {}, only grids are supported",
            origin.component,
            origin.category,
            other.name()
        ))),
    }
}

/// Check that every driving and ancillary variable is in the dataset with compatible
/// units and domains.
pub(crate) fn verify_dataset(
    definitions: &[RequirementDefinition],
    dataset: &DataSet,
    time: &TimeDomain,
    grid: &Grid,
    origin: &Origin,
) -> CouplingResult<()> {
    for definition in definitions {
        let is_driving = match definition.requirement_type {
            RequirementType::DrivingData => true,
            RequirementType::AncillaryData => false,
            _ => continue,
        };
        let variable = dataset
            .get(&definition.name)
            .ok_or_else(|| CouplingError::MissingData {
                variable: definition.name.clone(),
                category: origin.category.to_string(),
                component: origin.component.to_string(),
            })?;

        if !units_equal(&definition.unit, variable.units()) {
            return Err(CouplingError::UnitsIncompatible {
                variable: definition.name.clone(),
                category: origin.category.to_string(),
                component: origin.component.to_string(),
                expected: definition.unit.clone(),
                found: variable.units().to_string(),
            });
        }

        match (is_driving, variable.time()) {
            (true, None) => {
                return Err(origin.domain_error(format!(
                    "driving data '{}' has no time coordinate",
                    definition.name
                )))
            }
            (true, Some(coordinate)) if !time.is_time_equal_to(coordinate) => {
                return Err(origin.domain_error(format!(
                    "time coordinate of '{}' does not match the temporal domain",
                    definition.name
                )))
            }
            (false, Some(_)) => {
                return Err(origin.domain_error(format!(
                    "ancillary data '{}' must not vary in time",
                    definition.name
                )))
            }
            _ => {}
        }

        if !grid.is_space_equal_to(variable.grid()) {
            return Err(origin.domain_error(format!(
                "spatial coordinate of '{}' does not match the spatial domain {grid}",
                definition.name
            )));
        }
    }
    Ok(())
}

/// Check that every declared parameter was supplied, reporting all the missing ones.
pub(crate) fn verify_parameters(
    definitions: &[RequirementDefinition],
    parameters: &HashMap<String, f64>,
    origin: &Origin,
) -> CouplingResult<()> {
    let mut missing: Vec<String> = names_of(definitions, RequirementType::Parameter)
        .into_iter()
        .filter(|name| !parameters.contains_key(*name))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(CouplingError::MissingParameter {
        category: origin.category.to_string(),
        component: origin.component.to_string(),
        missing,
    })
}
