//! Basic model tests: simulate, wiring, dot, serialisation.

use super::{days, grid, test_component};
use crate::component::Category;
use crate::errors::CouplingError;
use crate::model::{Model, ModelBuilder, ModelComponent};
use crate::space::{Grid, GridLocation, SpaceDomain};
use is_close::is_close;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

const DAY: f64 = 86400.0;

fn model(last_day: i32) -> Model {
    Model::new(
        test_component(Category::SurfaceLayer, days(last_day, 1)),
        test_component(Category::SubSurface, days(last_day, 1)),
        test_component(Category::OpenWater, days(last_day, 1)),
    )
    .unwrap()
}

#[test]
fn test_simulate() {
    let mut model = model(4);
    let interface = model.simulate().unwrap();

    for category in Category::ALL {
        for transfer in category.outwards() {
            let values = &interface[transfer.name];
            assert_eq!(values.shape(), &[2, 3]);
            // factor * forcing of the last step
            assert!(values.iter().all(|v| is_close!(*v, 6.0)), "{}", transfer.name);
        }
    }
    // Initial state values are part of the interface
    assert!(interface.contains_key("store"));

    let store = &model.states(Category::OpenWater)["store"];
    assert_eq!(store.len(), 2);
    assert!(is_close!(store[-1][[1, 2]], 6.0 * DAY));
    assert!(store[0].iter().all(|v| *v == 0.0));
}

#[test]
fn test_simulate_is_repeatable() {
    let mut model = model(3);
    let first = model.simulate().unwrap();
    let second = model.simulate().unwrap();
    assert_eq!(first, second);
    assert!(is_close!(
        model.states(Category::SurfaceLayer)["store"][-1][[0, 0]],
        3.0 * DAY
    ));
}

#[test]
fn test_coarser_categories_step_less_often() {
    let mut model = Model::new(
        test_component(Category::SurfaceLayer, days(4, 1)),
        test_component(Category::SubSurface, days(4, 2)),
        test_component(Category::OpenWater, days(4, 4)),
    )
    .unwrap();
    let interface = model.simulate().unwrap();

    // Two subsurface steps of two days with forcing 0 then 1
    let store = &model.states(Category::SubSurface)["store"];
    assert!(is_close!(store[-1][[0, 0]], 2.0 * DAY));
    // A single open water step of four days with forcing 0
    let store = &model.states(Category::OpenWater)["store"];
    assert_eq!(store[-1][[0, 0]], 0.0);

    assert!(is_close!(interface["throughfall"][[0, 0]], 6.0));
    assert!(is_close!(interface["runoff"][[0, 0]], 2.0));
    assert_eq!(interface["discharge"][[0, 0]], 0.0);
}

#[test]
fn test_finer_categories_are_not_supported() {
    let result = Model::new(
        test_component(Category::SurfaceLayer, days(4, 2)),
        test_component(Category::SubSurface, days(4, 1)),
        test_component(Category::OpenWater, days(4, 2)),
    );
    assert!(matches!(result, Err(CouplingError::NotSupported(_))));
}

#[test]
fn test_different_spans_are_not_supported() {
    let result = Model::new(
        test_component(Category::SurfaceLayer, days(4, 1)),
        test_component(Category::SubSurface, days(4, 1)),
        test_component(Category::OpenWater, days(5, 1)),
    );
    assert!(matches!(result, Err(CouplingError::NotSupported(_))));
}

#[test]
fn test_different_grids_are_not_supported() {
    let time = days(2, 1);
    let other_grid =
        Grid::from_extent_and_resolution((0.0, 2.0), (0.0, 3.0), 0.5, 0.5, GridLocation::Centre)
            .unwrap();
    let result = Model::new(
        test_component(Category::SurfaceLayer, time.clone()),
        test_component(Category::SubSurface, time.clone()),
        ModelComponent::null_substitute(Category::OpenWater, time, SpaceDomain::Grid(other_grid))
            .unwrap(),
    );
    assert!(matches!(result, Err(CouplingError::NotSupported(_))));
}

#[test]
fn test_slot_must_match_category() {
    let time = days(2, 1);
    let result = Model::new(
        test_component(Category::SubSurface, time.clone()),
        test_component(Category::SurfaceLayer, time.clone()),
        test_component(Category::OpenWater, time),
    );
    match result {
        Err(CouplingError::TypeMismatch { category, found }) => {
            assert_eq!(category, "surfacelayer");
            assert!(found.contains("TestComponent"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_builder_routes_by_category() {
    let time = days(2, 1);
    let mut builder = ModelBuilder::new();
    builder
        .with_component(test_component(Category::OpenWater, time.clone()))
        .with_component(test_component(Category::SurfaceLayer, time.clone()));

    assert!(matches!(
        builder.build(),
        Err(CouplingError::MissingComponent(category)) if category == "subsurface"
    ));

    builder.with_component(test_component(Category::SubSurface, time.clone()));
    let model = builder.build().unwrap();
    assert_eq!(
        model.component(Category::OpenWater).category(),
        Category::OpenWater
    );

    builder.with_component(
        ModelComponent::null_substitute(Category::OpenWater, time, SpaceDomain::Grid(grid()))
            .unwrap(),
    );
    assert!(matches!(
        builder.build(),
        Err(CouplingError::DuplicateComponent(category)) if category == "openwater"
    ));
}

#[test]
fn test_dot() {
    let model = model(2);
    let dot = format!("{:?}", model.as_dot());

    assert!(dot.starts_with("digraph {"));
    assert!(dot.contains("label = \"surfacelayer\""));
    assert!(dot.contains("0 -> 1 [ label = \"throughfall\"]"));
    assert!(dot.contains("1 -> 0 [ label = \"soil_water_stress\"]"));
    assert!(dot.contains("1 -> 2 [ label = \"runoff\"]"));
    // One edge per inward of every category
    assert_eq!(model.graph().edge_count(), 8);
}

#[test]
fn test_every_inward_is_wired() {
    let model = model(2);
    for (position, category) in Category::ALL.into_iter().enumerate() {
        let node = NodeIndex::new(position);
        assert_eq!(model.graph()[node].category(), category);

        let mut wired: Vec<&str> = model
            .graph()
            .edges_directed(node, Direction::Incoming)
            .map(|edge| edge.weight().as_str())
            .collect();
        let mut inwards: Vec<&str> = category.inwards().iter().map(|t| t.name).collect();
        wired.sort();
        inwards.sort();
        assert_eq!(wired, inwards, "{category}");
    }
}

fn null_model() -> Model {
    let time = days(2, 1);
    let null = |category| {
        ModelComponent::null_substitute(category, time.clone(), SpaceDomain::Grid(grid()))
            .unwrap()
    };
    Model::new(
        null(Category::SurfaceLayer),
        null(Category::SubSurface),
        null(Category::OpenWater),
    )
    .unwrap()
}

#[test]
fn test_deserialised_model_is_wired_again() {
    let mut value = serde_json::to_value(null_model()).unwrap();
    assert!(serde_json::from_value::<Model>(value.clone()).is_ok());

    let southern =
        Grid::from_extent_and_resolution((-40.0, -38.0), (0.0, 3.0), 1.0, 1.0, GridLocation::Centre)
            .unwrap();
    value["subsurface"]["grid"] = serde_json::to_value(southern).unwrap();
    let error = serde_json::from_value::<Model>(value).unwrap_err();
    assert!(
        error.to_string().contains("different spatial domains"),
        "{error}"
    );
}

#[test]
fn test_deserialised_component_is_validated_again() {
    let model = model(2);
    let mut value = serde_json::to_value(&model).unwrap();
    value["openwater"]["parameters"]
        .as_object_mut()
        .unwrap()
        .remove("delay");

    let error = serde_json::from_value::<Model>(value).unwrap_err();
    assert!(
        error.to_string().contains("missing the parameter(s): delay"),
        "{error}"
    );
}

#[test]
fn test_serialise_and_deserialise_model() {
    let mut model = model(3);

    let serialised = serde_json::to_string_pretty(&model).unwrap();
    let mut deserialised = serde_json::from_str::<Model>(&serialised).unwrap();

    assert_eq!(
        deserialised.component(Category::SubSurface).name(),
        "TestComponent"
    );
    assert_eq!(model.simulate().unwrap(), deserialised.simulate().unwrap());
}
