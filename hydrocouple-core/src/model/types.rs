//! Type definitions for the model module.

use crate::component::{Component, ComponentKind};
use petgraph::Graph;
use std::sync::Arc;

/// Type alias for a component wrapped in an Arc for shared ownership.
pub type C = Arc<dyn Component>;

/// Categories (as the kind of component filling them) linked by the names of the
/// variables they transfer to each other.
pub type TransferGraph = Graph<ComponentKind, String>;
