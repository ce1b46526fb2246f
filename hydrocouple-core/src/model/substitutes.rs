//! Structural stand-ins for the physical component of a category.
//!
//! Substitutes satisfy the outwards of a category without doing any physical
//! computation, declare no parameters, constants or states and read nothing from the
//! interface.

use crate::component::{
    Category, Component, ComponentKind, InitialStates, InitialisationContext, Inputs, Interface,
    RequirementDefinition, RequirementType,
};
use crate::errors::CouplingResult;
use crate::state::States;
use serde::{Deserialize, Serialize};

/// Replays recorded values of the outwards of a category.
///
/// Every outward is declared as driving data, so the dataset bound to the substitute
/// must hold one variable per outward, in the unit of the outward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataComponent {
    category: Category,
}

impl DataComponent {
    pub fn new(category: Category) -> Self {
        Self { category }
    }
}

#[typetag::serde]
impl Component for DataComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::DataSubstitute(self.category)
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        self.category
            .outwards()
            .iter()
            .map(|t| RequirementDefinition::new(t.name, t.unit, RequirementType::DrivingData))
            .collect()
    }

    fn initialise(&self, _context: &InitialisationContext) -> CouplingResult<InitialStates> {
        Ok(InitialStates::new())
    }

    fn run(&self, inputs: &Inputs, _states: &mut States) -> CouplingResult<Interface> {
        self.category
            .outwards()
            .iter()
            .map(|t| Ok((t.name.to_string(), inputs.get(t.name)?.to_owned())))
            .collect()
    }

    fn finalise(&self, _states: &States) -> CouplingResult<()> {
        Ok(())
    }
}

/// Switches a category off by producing zeros for all of its outwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullComponent {
    category: Category,
}

impl NullComponent {
    pub fn new(category: Category) -> Self {
        Self { category }
    }
}

#[typetag::serde]
impl Component for NullComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::NullSubstitute(self.category)
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![]
    }

    fn initialise(&self, _context: &InitialisationContext) -> CouplingResult<InitialStates> {
        Ok(InitialStates::new())
    }

    fn run(&self, inputs: &Inputs, _states: &mut States) -> CouplingResult<Interface> {
        Ok(self
            .category
            .outwards()
            .iter()
            .map(|t| (t.name.to_string(), inputs.zeros()))
            .collect())
    }

    fn finalise(&self, _states: &States) -> CouplingResult<()> {
        Ok(())
    }
}
