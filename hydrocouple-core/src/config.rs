//! Parameters and constants of each category, read from TOML.
//!
//! ```toml
//! [surfacelayer.constants]
//! degree_day_factor = 4e-5
//!
//! [subsurface.parameters]
//! saturated_hydraulic_conductivity = 1e-4
//!
//! [openwater.parameters]
//! residence_time = 432000.0
//! ```

use crate::component::Category;
use crate::errors::CouplingResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSettings {
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
    #[serde(default)]
    pub constants: HashMap<String, f64>,
}

/// Settings of the three categories. Missing tables are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub surfacelayer: ComponentSettings,
    #[serde(default)]
    pub subsurface: ComponentSettings,
    #[serde(default)]
    pub openwater: ComponentSettings,
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> CouplingResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn get(&self, category: Category) -> &ComponentSettings {
        match category {
            Category::SurfaceLayer => &self.surfacelayer,
            Category::SubSurface => &self.subsurface,
            Category::OpenWater => &self.openwater,
        }
    }
}
