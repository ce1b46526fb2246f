//! Physical components of the terrestrial water cycle, one per category.
//!
//! These are deliberately simple conceptual models. They show how a component declares
//! its data, parameters, constants and states, and how it reads its inwards and rolling
//! states while running.

mod openwater;
mod subsurface;
mod surfacelayer;

pub use openwater::LinearReservoirOpenWater;
pub use subsurface::BucketSubSurface;
pub use surfacelayer::DegreeDaySurfaceLayer;

use hydrocouple_core::errors::{CouplingError, CouplingResult};
use hydrocouple_core::state::{RollingState, States};

/// Melting point of water
/// unit: K
pub(crate) const FREEZING_POINT: f64 = 273.15;

pub(crate) fn state_mut<'a>(
    states: &'a mut States,
    name: &str,
) -> CouplingResult<&'a mut RollingState> {
    states
        .get_mut(name)
        .ok_or_else(|| CouplingError::InvalidState(format!("no rolling state named '{name}'")))
}
