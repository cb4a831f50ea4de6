// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end layout scenarios driven through the public API.

use craftflow_graph::domain::{Dataset, DomainGraph, TransformationDef};
use craftflow_graph::{
    DragState, InteractionController, LayoutGraph, LayoutSettings, NodeId, RenderLoop, Side,
};
use egui::{Pos2, Rect, Vec2};
use std::collections::HashMap;
use std::sync::Arc;

const CONTAINER: Vec2 = Vec2::new(800.0, 600.0);
const THING_SIZE: Vec2 = Vec2::new(100.0, 40.0);
const RECIPE_SIZE: Vec2 = Vec2::new(160.0, 50.0);

fn circuit_domain() -> DomainGraph {
    DomainGraph::from_dataset(Dataset {
        default_transformation: Some("electronic-circuit".to_string()),
        transformations: vec![
            TransformationDef::new("electronic-circuit")
                .with_ingredients(["iron-plate", "copper-cable"])
                .with_products(["electronic-circuit"]),
            TransformationDef::new("copper-cable")
                .with_ingredients(["copper-plate"])
                .with_products(["copper-cable"]),
        ],
        ..Dataset::default()
    })
    .unwrap()
}

/// Add a transformation and place it with fixed card sizes
fn place(graph: &mut LayoutGraph, domain: &DomainGraph, name: &str) -> Vec<NodeId> {
    let id = domain.transformation_by_name(name).unwrap();
    let pending = graph.add_transformation(domain, id).unwrap();
    let sizes: HashMap<NodeId, Vec2> = pending
        .nodes()
        .iter()
        .map(|node| {
            let size = if graph.node(*node).unwrap().is_thing() {
                THING_SIZE
            } else {
                RECIPE_SIZE
            };
            (*node, size)
        })
        .collect();
    graph.assign_positions(&pending, &sizes, CONTAINER).unwrap();
    pending.nodes().to_vec()
}

fn strictly_overlap(a: Rect, b: Rect) -> bool {
    a.left() < b.right() && b.left() < a.right() && a.top() < b.bottom() && b.top() < a.bottom()
}

#[test]
fn test_first_insertion_layout() {
    let domain = circuit_domain();
    let mut graph = LayoutGraph::default();
    let created = place(&mut graph, &domain, "electronic-circuit");

    assert_eq!(created.len(), 4);
    assert_eq!(graph.node_count(), 4);

    let recipe = graph.node(created[0]).unwrap();
    assert!(recipe.is_transformation());
    assert_eq!(recipe.position, Pos2::new(400.0 - RECIPE_SIZE.x / 2.0, 20.0));

    let recipe_rect = recipe.rect().unwrap();
    for &ingredient in recipe.neighbors(Side::Left) {
        let rect = graph.node(ingredient).unwrap().rect().unwrap();
        assert!(rect.right() <= recipe_rect.left());
    }
    for &product in recipe.neighbors(Side::Right) {
        let rect = graph.node(product).unwrap().rect().unwrap();
        assert!(rect.left() >= recipe_rect.right());
    }

    let rects: Vec<Rect> = graph.nodes().map(|n| n.rect().unwrap()).collect();
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!strictly_overlap(*a, *b), "{a:?} overlaps {b:?}");
        }
    }
    assert!(graph.validate().is_ok());
}

#[test]
fn test_removing_sole_transformation_empties_graph() {
    let domain = circuit_domain();
    let mut graph = LayoutGraph::default();
    let created = place(&mut graph, &domain, "electronic-circuit");

    let removed = graph.remove_transformation(created[0]).unwrap();
    assert_eq!(removed.len(), 4);
    assert_eq!(removed[0], created[0]);
    assert!(graph.is_empty());
    assert!(graph.edges().is_empty());
    assert!(graph.validate().is_ok());
}

#[test]
fn test_shared_thing_is_reused() {
    let domain = DomainGraph::from_dataset(Dataset {
        transformations: vec![
            TransformationDef::new("t1").with_products(["x"]),
            TransformationDef::new("t2").with_ingredients(["x"]),
        ],
        ..Dataset::default()
    })
    .unwrap();
    let mut graph = LayoutGraph::default();

    let first = place(&mut graph, &domain, "t1");
    let second = place(&mut graph, &domain, "t2");
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);

    let x = graph.thing_node(domain.thing_by_name("x").unwrap()).unwrap();
    let x_node = graph.node(x).unwrap();
    assert_eq!(x_node.neighbors(Side::Left), &[first[0]]);
    assert_eq!(x_node.neighbors(Side::Right), &[second[0]]);
    assert_eq!(graph.nodes().filter(|n| n.is_thing()).count(), 1);

    // t2 sits right of x, level with it
    let x_rect = x_node.rect().unwrap();
    let t2 = graph.node(second[0]).unwrap();
    assert_eq!(t2.position, Pos2::new(x_rect.right() + 50.0, x_rect.top()));
}

#[test]
fn test_extending_keeps_earlier_nodes_in_place() {
    let domain = circuit_domain();
    let mut graph = LayoutGraph::default();
    place(&mut graph, &domain, "electronic-circuit");
    let before: Vec<Pos2> = graph.nodes().map(|n| n.position).collect();

    let cable = graph.thing_node(domain.thing_by_name("copper-cable").unwrap()).unwrap();
    let producer = graph.next_addable(&domain, cable, Side::Left).unwrap();
    assert_eq!(domain.transformation(producer).unwrap().name, "copper-cable");
    let created = place(&mut graph, &domain, "copper-cable");

    let after: Vec<Pos2> = graph.nodes().take(before.len()).map(|n| n.position).collect();
    assert_eq!(before, after);

    let cable_rect = graph.node(cable).unwrap().rect().unwrap();
    let recipe = graph.node(created[0]).unwrap();
    assert_eq!(recipe.position.x, cable_rect.left() - 50.0 - RECIPE_SIZE.x);
    assert_eq!(graph.next_addable(&domain, cable, Side::Left), None);
}

#[test]
fn test_drag_is_clamped_to_container() {
    let mut controller =
        InteractionController::new(Arc::new(circuit_domain()), LayoutSettings::default());
    assert!(controller.observe_container(CONTAINER).unwrap());
    let sizes: HashMap<_, _> = controller
        .pending()
        .unwrap()
        .nodes()
        .iter()
        .map(|id| (*id, THING_SIZE))
        .collect();
    controller.complete_insertion(&sizes).unwrap();

    let node = controller.graph().node_ids().next().unwrap();
    let start = controller.graph().node(node).unwrap().position;
    controller.pointer_down(node, start).unwrap();
    assert!(matches!(controller.drag_state(), DragState::Dragging { .. }));

    let far = controller.pointer_move(Pos2::new(5000.0, 5000.0)).unwrap();
    assert_eq!(far, Pos2::new(800.0 - THING_SIZE.x, 600.0 - THING_SIZE.y));

    let near = controller.pointer_move(Pos2::new(-5000.0, -5000.0)).unwrap();
    assert_eq!(near, Pos2::ZERO);

    controller.pointer_leave();
    assert_eq!(controller.drag_state(), DragState::Idle);
    assert_eq!(controller.graph().node(node).unwrap().position, Pos2::ZERO);
}

#[test]
fn test_render_is_idempotent() {
    let domain = circuit_domain();
    let mut graph = LayoutGraph::default();
    place(&mut graph, &domain, "electronic-circuit");
    place(&mut graph, &domain, "copper-cable");

    let mut render = RenderLoop::new();
    let first = render.prepare(&graph, CONTAINER).to_vec();
    assert_eq!(first.len(), graph.edges().len());

    render.invalidate();
    let second = render.prepare(&graph, CONTAINER).to_vec();
    assert_eq!(first, second);

    let fresh = RenderLoop::new().prepare(&graph, CONTAINER).to_vec();
    assert_eq!(first, fresh);
}
