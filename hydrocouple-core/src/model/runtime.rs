//! Model struct and runtime execution.

use crate::component::{Category, Interface};
use crate::errors::{CouplingError, CouplingResult};
use crate::state::States;
use crate::time::Clock;
use crate::units::units_equal;
use ndarray::{ArrayD, IxDyn};
use petgraph::dot::{Config, Dot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::binding::ModelComponent;
use super::types::TransferGraph;

/// A surface layer, a subsurface and an open water component solved together.
///
/// Components exchange their outwards through an interface shared for the duration of
/// one [`Model::simulate`] call. Every step of the surface layer temporal domain, the
/// active categories run in the order surface layer, subsurface, open water, so that
/// the subsurface reads the surface layer outwards of the same step and the open water
/// reads those of the subsurface.
///
/// Components may step at coarser resolutions than the surface layer, in which case
/// they only run at the timestamps of their own temporal domain.
///
/// A deserialised model is wired again with [`Model::new`], so it passes the same checks
/// as one built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ModelRepr")]
pub struct Model {
    surfacelayer: ModelComponent,
    subsurface: ModelComponent,
    openwater: ModelComponent,
    /// Which outwards of one category are inwards of another.
    graph: TransferGraph,
}

#[derive(Deserialize)]
struct ModelRepr {
    surfacelayer: ModelComponent,
    subsurface: ModelComponent,
    openwater: ModelComponent,
}

impl TryFrom<ModelRepr> for Model {
    type Error = CouplingError;

    fn try_from(repr: ModelRepr) -> CouplingResult<Self> {
        Self::new(repr.surfacelayer, repr.subsurface, repr.openwater)
    }
}

impl Model {
    /// Wire three components together.
    ///
    /// Fails if a component does not fill the category of its slot, if the components
    /// do not share a spatial domain, or if their temporal domains cannot be stepped
    /// together.
    pub fn new(
        surfacelayer: ModelComponent,
        subsurface: ModelComponent,
        openwater: ModelComponent,
    ) -> CouplingResult<Self> {
        for (slot, component) in [
            (Category::SurfaceLayer, &surfacelayer),
            (Category::SubSurface, &subsurface),
            (Category::OpenWater, &openwater),
        ] {
            if component.category() != slot {
                return Err(CouplingError::TypeMismatch {
                    category: slot.to_string(),
                    found: format!("{} ({})", component.name(), component.kind()),
                });
            }
        }

        for other in [&subsurface, &openwater] {
            verify_domains(&surfacelayer, other)?;
        }

        let components = [&surfacelayer, &subsurface, &openwater];
        let graph = wire(&components)?;

        Ok(Self {
            surfacelayer,
            subsurface,
            openwater,
            graph,
        })
    }

    pub fn component(&self, category: Category) -> &ModelComponent {
        match category {
            Category::SurfaceLayer => &self.surfacelayer,
            Category::SubSurface => &self.subsurface,
            Category::OpenWater => &self.openwater,
        }
    }

    fn component_mut(&mut self, category: Category) -> &mut ModelComponent {
        match category {
            Category::SurfaceLayer => &mut self.surfacelayer,
            Category::SubSurface => &mut self.subsurface,
            Category::OpenWater => &mut self.openwater,
        }
    }

    /// Rolling states of a category, as left by the last simulation.
    pub fn states(&self, category: Category) -> &States {
        self.component(category).states()
    }

    /// Run the components over their temporal domains.
    ///
    /// Each call starts afresh: states are re-initialised and the interface is
    /// re-seeded with zeros for every outward. Returns the interface as it stands after
    /// the last step, which holds every outward of every category and the initial
    /// values of every state.
    ///
    /// An error in any component aborts the simulation without finalising any
    /// component.
    pub fn simulate(&mut self) -> CouplingResult<Interface> {
        let shape = self.surfacelayer.grid().shape();
        let mut interface: Interface = Category::ALL
            .iter()
            .flat_map(|category| category.outwards())
            .map(|t| (t.name.to_string(), ArrayD::zeros(IxDyn(&shape))))
            .collect();

        for category in Category::ALL {
            let initial = self.component_mut(category).initialise_states()?;
            interface.extend(initial);
        }

        let clock = Clock::new(
            self.surfacelayer.time(),
            self.subsurface.time(),
            self.openwater.time(),
        )?;
        let active_steps = |category: Category| {
            clock.switches(category)[..clock.steps()]
                .iter()
                .filter(|on| **on)
                .count()
        };
        info!(
            steps = clock.steps(),
            surfacelayer = active_steps(Category::SurfaceLayer),
            subsurface = active_steps(Category::SubSurface),
            openwater = active_steps(Category::OpenWater),
            "starting simulation"
        );

        let mut counters = [0usize; 3];
        for tick in clock {
            for (position, category) in Category::ALL.into_iter().enumerate() {
                if !tick.is_active(category) {
                    continue;
                }
                let component = self.component_mut(category);
                let outwards = component.run_step(counters[position], &interface)?;
                interface.extend(outwards);
                component.increment_states();
                debug!(
                    %category,
                    component = component.name(),
                    step = counters[position],
                    index = tick.index,
                    "stepped component"
                );
                counters[position] += 1;
            }
        }

        for category in Category::ALL {
            self.component(category).finalise_states()?;
        }
        info!(
            surfacelayer = counters[0],
            subsurface = counters[1],
            openwater = counters[2],
            "finished simulation"
        );
        Ok(interface)
    }

    /// Create a diagram that represents the transfer graph.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> Dot<'_, &TransferGraph> {
        Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, er| format!("label = {:?}", er.weight()),
            &|_, (_, kind)| format!("label = \"{kind}\""),
        )
    }

    pub fn graph(&self) -> &TransferGraph {
        &self.graph
    }
}

/// Components must share the spatial domain and the span of the surface layer temporal
/// domain, stepping at a whole multiple of its timestep.
fn verify_domains(surfacelayer: &ModelComponent, other: &ModelComponent) -> CouplingResult<()> {
    if other.grid() != surfacelayer.grid() {
        return Err(CouplingError::NotSupported(format!(
            "{} ({}) and {} ({}) have different spatial domains",
            other.name(),
            other.category(),
            surfacelayer.name(),
            surfacelayer.category()
        )));
    }

    let (reference, time) = (surfacelayer.time(), other.time());
    let reason = if time.calendar() != reference.calendar() {
        Some("calendars differ")
    } else if time.start() != reference.start() || time.end() != reference.end() {
        Some("start or end differ")
    } else if time.timestep_seconds() % reference.timestep_seconds() != 0 {
        Some("the timestep is not a multiple of the surface layer timestep")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CouplingError::NotSupported(format!(
            "{} ({}) and {} ({}) have incompatible temporal domains: {reason}",
            other.name(),
            other.category(),
            surfacelayer.name(),
            surfacelayer.category()
        ))),
        None => Ok(()),
    }
}

/// Build the transfer graph, linking every inward to the component producing it.
fn wire(components: &[&ModelComponent; 3]) -> CouplingResult<TransferGraph> {
    let mut graph = TransferGraph::new();
    let nodes: Vec<_> = components
        .iter()
        .map(|component| graph.add_node(component.kind()))
        .collect();

    for (consumer_index, consumer) in components.iter().enumerate() {
        for inward in consumer.kind().inwards() {
            let producer = components.iter().enumerate().find(|(index, producer)| {
                *index != consumer_index
                    && producer
                        .kind()
                        .outwards()
                        .iter()
                        .any(|t| t.name == inward.name && units_equal(t.unit, inward.unit))
            });
            let Some((producer_index, _)) = producer else {
                return Err(CouplingError::MissingData {
                    variable: inward.name.to_string(),
                    category: consumer.category().to_string(),
                    component: consumer.name().to_string(),
                });
            };
            graph.add_edge(
                nodes[producer_index],
                nodes[consumer_index],
                inward.name.to_string(),
            );
        }
    }
    Ok(graph)
}
