//! A model couples one component per category and solves them together.
//!
//! Components are first bound to their temporal and spatial domains, their dataset and
//! their parameters and constants as [`ModelComponent`]s, which validates everything a
//! component declares. Three bound components are then wired into a [`Model`], either
//! directly with [`Model::new`] or through a [`ModelBuilder`].
//!
//! A category can be filled by a physical component, by a data substitute replaying
//! recorded outwards ([`DataComponent`]) or by a null substitute producing zeros
//! ([`NullComponent`]).

mod binding;
mod builder;
mod runtime;
mod substitutes;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Public re-exports
pub use binding::ModelComponent;
pub use builder::ModelBuilder;
pub use runtime::Model;
pub use substitutes::{DataComponent, NullComponent};
pub use types::{TransferGraph, C};
