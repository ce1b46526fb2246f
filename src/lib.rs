//! Coupling of the surface layer, subsurface and open water components of the
//! terrestrial water cycle.
//!
//! The coupling engine lives in [`core`] and the physical components shipped with it in
//! [`components`]. A model is assembled from one bound component per category:
//!
//! ```rust,ignore
//! use hydrocouple::core::model::{ModelBuilder, ModelComponent};
//!
//! let mut model = ModelBuilder::new()
//!     .with_component(surfacelayer)
//!     .with_component(subsurface)
//!     .with_component(openwater)
//!     .build()?;
//! let outputs = model.simulate()?;
//! ```

pub mod core {
    pub use hydrocouple_core::*;
}

pub mod components {
    pub use hydrocouple_components::*;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
