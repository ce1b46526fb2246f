use serde::{Deserialize, Serialize};
use std::fmt;

/// A variable exchanged between categories through the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transfer {
    pub name: &'static str,
    pub unit: &'static str,
}

const fn transfer(name: &'static str, unit: &'static str) -> Transfer {
    Transfer { name, unit }
}

const MASS_FLUX: &str = "kg m-2 s-1";

const SURFACELAYER_INWARDS: &[Transfer] = &[transfer("soil_water_stress", "1")];
const SURFACELAYER_OUTWARDS: &[Transfer] = &[
    transfer("throughfall", MASS_FLUX),
    transfer("snowmelt", MASS_FLUX),
    transfer("transpiration", MASS_FLUX),
    transfer("evaporation_soil_surface", MASS_FLUX),
    transfer("evaporation_ponded_water", MASS_FLUX),
    transfer("evaporation_openwater", MASS_FLUX),
];

const SUBSURFACE_INWARDS: &[Transfer] = &[
    transfer("evaporation_soil_surface", MASS_FLUX),
    transfer("evaporation_ponded_water", MASS_FLUX),
    transfer("transpiration", MASS_FLUX),
    transfer("throughfall", MASS_FLUX),
    transfer("snowmelt", MASS_FLUX),
];
const SUBSURFACE_OUTWARDS: &[Transfer] = &[
    transfer("runoff", MASS_FLUX),
    transfer("soil_water_stress", "1"),
];

const OPENWATER_INWARDS: &[Transfer] = &[
    transfer("evaporation_openwater", MASS_FLUX),
    transfer("runoff", MASS_FLUX),
];
const OPENWATER_OUTWARDS: &[Transfer] = &[transfer("discharge", MASS_FLUX)];

/// The physical process role a component fills.
///
/// Categories are stepped in the order of [`Category::ALL`] every timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    SurfaceLayer,
    SubSurface,
    OpenWater,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::SurfaceLayer,
        Category::SubSurface,
        Category::OpenWater,
    ];

    /// Variables every component of this category reads from the interface.
    pub fn inwards(&self) -> &'static [Transfer] {
        match self {
            Category::SurfaceLayer => SURFACELAYER_INWARDS,
            Category::SubSurface => SUBSURFACE_INWARDS,
            Category::OpenWater => OPENWATER_INWARDS,
        }
    }

    /// Variables every component of this category writes to the interface.
    pub fn outwards(&self) -> &'static [Transfer] {
        match self {
            Category::SurfaceLayer => SURFACELAYER_OUTWARDS,
            Category::SubSurface => SUBSURFACE_OUTWARDS,
            Category::OpenWater => OPENWATER_OUTWARDS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::SurfaceLayer => "surfacelayer",
            Category::SubSurface => "subsurface",
            Category::OpenWater => "openwater",
        };
        write!(f, "{name}")
    }
}

/// What kind of component fills a category.
///
/// Physical components carry their category's inwards and outwards. Substitutes carry
/// the outwards of the category they stand in for and read nothing from the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    SurfaceLayer,
    SubSurface,
    OpenWater,
    /// Replays recorded values of the outwards of a category.
    DataSubstitute(Category),
    /// Produces zeros for the outwards of a category.
    NullSubstitute(Category),
}

impl ComponentKind {
    pub fn category(&self) -> Category {
        match self {
            ComponentKind::SurfaceLayer => Category::SurfaceLayer,
            ComponentKind::SubSurface => Category::SubSurface,
            ComponentKind::OpenWater => Category::OpenWater,
            ComponentKind::DataSubstitute(category) | ComponentKind::NullSubstitute(category) => {
                *category
            }
        }
    }

    pub fn inwards(&self) -> &'static [Transfer] {
        match self {
            ComponentKind::DataSubstitute(_) | ComponentKind::NullSubstitute(_) => &[],
            _ => self.category().inwards(),
        }
    }

    pub fn outwards(&self) -> &'static [Transfer] {
        self.category().outwards()
    }

    pub fn is_substitute(&self) -> bool {
        matches!(
            self,
            ComponentKind::DataSubstitute(_) | ComponentKind::NullSubstitute(_)
        )
    }
}

impl From<Category> for ComponentKind {
    fn from(category: Category) -> Self {
        match category {
            Category::SurfaceLayer => ComponentKind::SurfaceLayer,
            Category::SubSurface => ComponentKind::SubSurface,
            Category::OpenWater => ComponentKind::OpenWater,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::DataSubstitute(category) => write!(f, "data substitute ({category})"),
            ComponentKind::NullSubstitute(category) => write!(f, "null substitute ({category})"),
            _ => write!(f, "{}", self.category()),
        }
    }
}
