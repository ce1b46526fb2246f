//! Model builder for assembling a model from bound components.

use crate::component::Category;
use crate::errors::{CouplingError, CouplingResult};

use super::binding::ModelComponent;
use super::runtime::Model;

/// Collects components in any order and places each in the slot of its category.
///
/// ```rust,ignore
/// let model = ModelBuilder::new()
///     .with_component(openwater)
///     .with_component(surfacelayer)
///     .with_component(subsurface)
///     .build()?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct ModelBuilder {
    components: Vec<ModelComponent>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(&mut self, component: ModelComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    fn take_slot(&self, category: Category) -> CouplingResult<ModelComponent> {
        let mut candidates = self
            .components
            .iter()
            .filter(|component| component.category() == category);
        match (candidates.next(), candidates.next()) {
            (Some(component), None) => Ok(component.clone()),
            (None, _) => Err(CouplingError::MissingComponent(category.to_string())),
            (Some(_), Some(_)) => Err(CouplingError::DuplicateComponent(category.to_string())),
        }
    }

    /// Build the model, requiring exactly one component per category.
    pub fn build(&self) -> CouplingResult<Model> {
        Model::new(
            self.take_slot(Category::SurfaceLayer)?,
            self.take_slot(Category::SubSurface)?,
            self.take_slot(Category::OpenWater)?,
        )
    }
}
