// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout graph: visual nodes, their adjacency and incremental placement.
//!
//! Insertion is split in two phases. [`LayoutGraph::add_transformation`]
//! creates the topology synchronously and returns a [`PendingInsertion`];
//! once the new nodes have been measured by the view,
//! [`LayoutGraph::assign_positions`] places them next to the nodes they are
//! linked to.

use crate::domain::{DomainGraph, ThingId, TransformationId};
use crate::edge::Edge;
use crate::node::{NodeContent, NodeId, Side, VisualNode};
use egui::{Pos2, Rect, Vec2};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spacing used when placing new nodes and drawing edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Horizontal distance between a node and its neighbors
    pub horizontal_gap: f32,
    /// Vertical distance between stacked siblings
    pub vertical_gap: f32,
    /// Distance from the top of the surface to the first node
    pub top_margin: f32,
    /// Horizontal offset of edge control points from their anchors
    pub curve_offset: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            horizontal_gap: 50.0,
            vertical_gap: 20.0,
            top_margin: 20.0,
            curve_offset: 50.0,
        }
    }
}

/// Nodes created by one insertion, waiting to be measured and placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInsertion {
    nodes: Vec<NodeId>,
    into_empty: bool,
}

impl PendingInsertion {
    /// New nodes in positioning order, the transformation first
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The inserted transformation node
    pub fn root(&self) -> NodeId {
        self.nodes[0]
    }

    /// Check if a node belongs to this insertion
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Whether the graph was empty before this insertion
    pub fn into_empty(&self) -> bool {
        self.into_empty
    }
}

/// Layout graph of visual nodes
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    /// Nodes in sequence order
    nodes: IndexMap<NodeId, VisualNode>,
    /// Node showing each thing
    thing_nodes: HashMap<ThingId, NodeId>,
    /// Node showing each transformation
    transformation_nodes: HashMap<TransformationId, NodeId>,
    next_id: u64,
    revision: u64,
    settings: LayoutSettings,
}

impl LayoutGraph {
    /// Create an empty graph
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Layout settings
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.thing_nodes.clear();
        self.transformation_nodes.clear();
        self.revision += 1;
    }

    /// Counter bumped by every change to nodes, positions, sizes or links
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get a node by id
    pub fn node(&self, node_id: NodeId) -> Option<&VisualNode> {
        self.nodes.get(&node_id)
    }

    /// Nodes in sequence order
    pub fn nodes(&self) -> impl Iterator<Item = &VisualNode> {
        self.nodes.values()
    }

    /// Node ids in sequence order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node showing a thing, if any
    pub fn thing_node(&self, thing: ThingId) -> Option<NodeId> {
        self.thing_nodes.get(&thing).copied()
    }

    /// Node showing a transformation, if any
    pub fn transformation_node(&self, transformation: TransformationId) -> Option<NodeId> {
        self.transformation_nodes.get(&transformation).copied()
    }

    /// Insert a transformation together with any missing ingredient and
    /// product nodes, and link them.
    ///
    /// New nodes sit at the origin until [`Self::assign_positions`] runs.
    pub fn add_transformation(
        &mut self,
        domain: &DomainGraph,
        transformation_id: TransformationId,
    ) -> Result<PendingInsertion, LayoutError> {
        let transformation = domain
            .transformation(transformation_id)
            .ok_or(LayoutError::UnknownTransformation(transformation_id))?;

        if let Some(existing) = self.transformation_node(transformation_id) {
            return Err(LayoutError::AlreadyPresent {
                name: transformation.name.clone(),
                node: existing,
            });
        }

        let into_empty = self.nodes.is_empty();
        let anchored = transformation
            .ingredients
            .iter()
            .chain(transformation.products.iter())
            .any(|thing| self.thing_nodes.contains_key(thing));
        if !into_empty && !anchored {
            return Err(LayoutError::Disconnected(transformation.name.clone()));
        }

        let root = self.push_node(NodeContent::Transformation(transformation_id));
        self.transformation_nodes.insert(transformation_id, root);
        let mut created = vec![root];

        for &thing in &transformation.ingredients {
            let node = self.find_or_create_thing(thing, &mut created);
            self.link(node, root);
        }
        for &thing in &transformation.products {
            let node = self.find_or_create_thing(thing, &mut created);
            self.link(root, node);
        }

        self.revision += 1;
        tracing::info!(
            "Added transformation {} ({} new nodes, {} total)",
            transformation.name,
            created.len(),
            self.nodes.len()
        );
        debug_assert!(self.validate_with(domain).is_ok(), "{:?}", self.validate_with(domain));

        Ok(PendingInsertion {
            nodes: created,
            into_empty,
        })
    }

    /// Place the nodes of an insertion using their measured sizes.
    ///
    /// `sizes` must cover every pending node that has no recorded size.
    /// Everything is checked before any node moves.
    pub fn assign_positions(
        &mut self,
        pending: &PendingInsertion,
        sizes: &HashMap<NodeId, Vec2>,
        container: Vec2,
    ) -> Result<(), LayoutError> {
        for (i, &node_id) in pending.nodes.iter().enumerate() {
            let node = self.nodes.get(&node_id).ok_or(LayoutError::UnknownNode(node_id))?;
            if node.size.is_none() && !sizes.contains_key(&node_id) {
                return Err(LayoutError::Unmeasured(node_id));
            }
            if i == 0 && pending.into_empty {
                continue;
            }

            let mut anchors = node.all_neighbors().filter(|n| *n < node_id).peekable();
            if anchors.peek().is_none() {
                return Err(LayoutError::Unanchored(node_id));
            }
            for anchor in anchors {
                let measured = self.nodes.get(&anchor).is_some_and(|n| n.size.is_some())
                    || sizes.contains_key(&anchor);
                if !measured {
                    return Err(LayoutError::Unmeasured(anchor));
                }
            }
        }

        for (&node_id, &size) in sizes {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.size = Some(size);
            }
        }

        for (i, &node_id) in pending.nodes.iter().enumerate() {
            let position = if i == 0 && pending.into_empty {
                self.centered_position(node_id, container)
            } else {
                self.placement_for(node_id)
            };
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.position = position;
            }
            tracing::debug!("Placed node {:?} at {:?}", node_id, position);
        }

        self.revision += 1;
        Ok(())
    }

    fn centered_position(&self, node_id: NodeId, container: Vec2) -> Pos2 {
        let width = self.size_of(node_id).x;
        Pos2::new(container.x / 2.0 - width / 2.0, self.settings.top_margin)
    }

    /// Position for a new node, derived from its already placed neighbors.
    ///
    /// Only nodes earlier in the sequence count. Siblings are neighbors of
    /// those neighbors; the node is pushed below each one it would overlap.
    /// Later nodes may still overlap each other.
    fn placement_for(&self, node_id: NodeId) -> Pos2 {
        let Some(node) = self.nodes.get(&node_id) else {
            return Pos2::ZERO;
        };
        let size = node.size.unwrap_or(Vec2::ZERO);
        let earlier = |n: &NodeId| *n < node_id;

        let left: Vec<Rect> = node
            .left_neighbors
            .iter()
            .filter(|n| earlier(n))
            .filter_map(|n| self.rect_of(*n))
            .collect();
        let right: Vec<Rect> = node
            .right_neighbors
            .iter()
            .filter(|n| earlier(n))
            .filter_map(|n| self.rect_of(*n))
            .collect();

        let gap = self.settings.horizontal_gap;
        let rightmost_edge = left.iter().map(|r| r.right()).fold(f32::NEG_INFINITY, f32::max);
        let leftmost_edge = right.iter().map(|r| r.left()).fold(f32::INFINITY, f32::min);
        let x = match (left.is_empty(), right.is_empty()) {
            (false, true) => rightmost_edge + gap,
            (true, false) => leftmost_edge - gap - size.x,
            (false, false) => (rightmost_edge + leftmost_edge) / 2.0 - size.x / 2.0,
            (true, true) => {
                debug_assert!(false, "node {node_id:?} has no placed neighbor");
                return node.position;
            }
        };

        let mut y = left
            .iter()
            .chain(right.iter())
            .map(|r| r.top())
            .fold(f32::NEG_INFINITY, f32::max);

        let siblings: Vec<Rect> = node
            .all_neighbors()
            .filter(earlier)
            .filter_map(|n| self.nodes.get(&n))
            .flat_map(VisualNode::all_neighbors)
            .filter(earlier)
            .filter_map(|s| self.rect_of(s))
            .collect();

        let vertical_gap = self.settings.vertical_gap;
        while let Some(blocking) = siblings
            .iter()
            .find(|s| overlaps(Rect::from_min_size(Pos2::new(x, y), size), **s, vertical_gap))
        {
            y = blocking.bottom() + vertical_gap;
        }

        Pos2::new(x, y)
    }

    fn rect_of(&self, node_id: NodeId) -> Option<Rect> {
        self.nodes.get(&node_id).and_then(VisualNode::rect)
    }

    fn size_of(&self, node_id: NodeId) -> Vec2 {
        self.nodes
            .get(&node_id)
            .and_then(|n| n.size)
            .unwrap_or(Vec2::ZERO)
    }

    /// Remove a transformation node and every thing node left without
    /// neighbors. Returns the ids of all removed nodes, the transformation
    /// first.
    pub fn remove_transformation(&mut self, node_id: NodeId) -> Result<Vec<NodeId>, LayoutError> {
        let node = self.nodes.get(&node_id).ok_or(LayoutError::UnknownNode(node_id))?;
        let NodeContent::Transformation(transformation) = node.content else {
            return Err(LayoutError::NotATransformation(node_id));
        };
        let neighbors: Vec<NodeId> = node.all_neighbors().collect();

        for &neighbor in &neighbors {
            self.unlink(node_id, neighbor);
        }
        self.nodes.shift_remove(&node_id);
        self.transformation_nodes.remove(&transformation);

        let mut removed = vec![node_id];
        for neighbor in neighbors {
            let orphan = match self.nodes.get(&neighbor) {
                Some(node) if node.is_isolated() => node.content,
                _ => continue,
            };
            if let NodeContent::Thing(thing) = orphan {
                self.nodes.shift_remove(&neighbor);
                self.thing_nodes.remove(&thing);
                removed.push(neighbor);
            }
        }

        self.revision += 1;
        tracing::info!(
            "Removed transformation node {:?} ({} nodes pruned, {} left)",
            node_id,
            removed.len() - 1,
            self.nodes.len()
        );
        debug_assert!(self.validate().is_ok(), "{:?}", self.validate());
        Ok(removed)
    }

    /// Move a node
    pub fn set_position(&mut self, node_id: NodeId, position: Pos2) -> Result<(), LayoutError> {
        let node = self.nodes.get_mut(&node_id).ok_or(LayoutError::UnknownNode(node_id))?;
        if node.position != position {
            node.position = position;
            self.revision += 1;
        }
        Ok(())
    }

    /// Record the measured size of a node
    pub fn set_measured_size(&mut self, node_id: NodeId, size: Vec2) -> Result<(), LayoutError> {
        let node = self.nodes.get_mut(&node_id).ok_or(LayoutError::UnknownNode(node_id))?;
        if node.size != Some(size) {
            node.size = Some(size);
            self.revision += 1;
        }
        Ok(())
    }

    /// Deduplicated left-to-right edges, derived from the adjacency lists in
    /// sequence order
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = IndexSet::new();
        for node in self.nodes.values() {
            for &right in &node.right_neighbors {
                edges.insert(Edge::new(node.id, right));
            }
        }
        edges.into_iter().collect()
    }

    /// First transformation that could be pulled in next to a thing node and
    /// has no node yet: a producer for [`Side::Left`], a consumer for
    /// [`Side::Right`]. `None` for transformation nodes.
    pub fn next_addable(
        &self,
        domain: &DomainGraph,
        node_id: NodeId,
        side: Side,
    ) -> Option<TransformationId> {
        let NodeContent::Thing(thing) = self.nodes.get(&node_id)?.content else {
            return None;
        };
        let thing = domain.thing(thing)?;
        let candidates = match side {
            Side::Left => &thing.product_of,
            Side::Right => &thing.ingredient_of,
        };
        candidates
            .iter()
            .copied()
            .find(|t| !self.transformation_nodes.contains_key(t))
    }

    /// Check the uniqueness, symmetry and no-dangling invariants
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.thing_nodes.len() + self.transformation_nodes.len() != self.nodes.len() {
            return Err(InvariantViolation::IndexMismatch);
        }

        for node in self.nodes.values() {
            let indexed = match node.content {
                NodeContent::Thing(thing) => self.thing_nodes.get(&thing),
                NodeContent::Transformation(t) => self.transformation_nodes.get(&t),
            };
            if indexed != Some(&node.id) {
                return Err(InvariantViolation::DuplicateEntity(node.id));
            }

            for side in [Side::Left, Side::Right] {
                for &neighbor in node.neighbors(side) {
                    let other = self.nodes.get(&neighbor).ok_or(
                        InvariantViolation::DanglingLink {
                            node: node.id,
                            neighbor,
                        },
                    )?;
                    if !other.neighbors(side.opposite()).contains(&node.id) {
                        return Err(InvariantViolation::AsymmetricLink {
                            node: node.id,
                            neighbor,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// [`Self::validate`], then check that every shown ingredient and
    /// product of a shown transformation is linked on its side
    pub fn validate_with(&self, domain: &DomainGraph) -> Result<(), InvariantViolation> {
        self.validate()?;

        for (&transformation_id, &node_id) in &self.transformation_nodes {
            let Some(transformation) = domain.transformation(transformation_id) else {
                return Err(InvariantViolation::UnknownEntity(node_id));
            };
            let Some(node) = self.nodes.get(&node_id) else {
                return Err(InvariantViolation::IndexMismatch);
            };
            let sides = [
                (Side::Left, &transformation.ingredients),
                (Side::Right, &transformation.products),
            ];
            for (side, things) in sides {
                for thing in things.iter().filter_map(|t| self.thing_node(*t)) {
                    if !node.neighbors(side).contains(&thing) {
                        return Err(InvariantViolation::MissingLink {
                            transformation: node_id,
                            thing,
                        });
                    }
                }
            }
        }

        for (&thing_id, &node_id) in &self.thing_nodes {
            let Some(thing) = domain.thing(thing_id) else {
                return Err(InvariantViolation::UnknownEntity(node_id));
            };
            let Some(node) = self.nodes.get(&node_id) else {
                return Err(InvariantViolation::IndexMismatch);
            };
            let sides = [(Side::Left, &thing.product_of), (Side::Right, &thing.ingredient_of)];
            for (side, transformations) in sides {
                for transformation in transformations
                    .iter()
                    .filter_map(|t| self.transformation_node(*t))
                {
                    if !node.neighbors(side).contains(&transformation) {
                        return Err(InvariantViolation::MissingLink {
                            transformation,
                            thing: node_id,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn push_node(&mut self, content: NodeContent) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, VisualNode::new(id, content));
        id
    }

    fn find_or_create_thing(&mut self, thing: ThingId, created: &mut Vec<NodeId>) -> NodeId {
        if let Some(node) = self.thing_node(thing) {
            return node;
        }
        let node = self.push_node(NodeContent::Thing(thing));
        self.thing_nodes.insert(thing, node);
        created.push(node);
        node
    }

    /// Link `left` to `right` in both directions
    fn link(&mut self, left: NodeId, right: NodeId) {
        if let Some(node) = self.nodes.get_mut(&left) {
            if !node.right_neighbors.contains(&right) {
                node.right_neighbors.push(right);
            }
        }
        if let Some(node) = self.nodes.get_mut(&right) {
            if !node.left_neighbors.contains(&left) {
                node.left_neighbors.push(left);
            }
        }
    }

    /// Drop every link between two nodes, in both directions
    fn unlink(&mut self, a: NodeId, b: NodeId) {
        for (node, other) in [(a, b), (b, a)] {
            if let Some(node) = self.nodes.get_mut(&node) {
                for side in [Side::Left, Side::Right] {
                    node.neighbors_mut(side).retain(|n| *n != other);
                }
            }
        }
    }
}

/// Rectangles intersect, with the vertical extent of `other` padded by `gap`
fn overlaps(candidate: Rect, other: Rect, gap: f32) -> bool {
    candidate.left() < other.right()
        && other.left() < candidate.right()
        && candidate.top() < other.bottom() + gap
        && other.top() < candidate.bottom() + gap
}

/// Error from a layout graph operation. No operation mutates the graph when
/// it returns one of these.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Transformation id not in the domain graph
    #[error("Unknown transformation: {0:?}")]
    UnknownTransformation(TransformationId),

    /// Transformation already has a node
    #[error("Transformation {name} is already shown as {node:?}")]
    AlreadyPresent {
        /// Transformation name
        name: String,
        /// Existing node
        node: NodeId,
    },

    /// Transformation shares no thing with a non-empty graph
    #[error("Transformation {0} is not connected to any shown thing")]
    Disconnected(String),

    /// Node not found
    #[error("Node not found: {0:?}")]
    UnknownNode(NodeId),

    /// Node is not a transformation
    #[error("Node is not a transformation: {0:?}")]
    NotATransformation(NodeId),

    /// Node has no measured size
    #[error("Node has not been measured: {0:?}")]
    Unmeasured(NodeId),

    /// Node has no earlier neighbor to be placed against
    #[error("Node has no placed neighbor: {0:?}")]
    Unanchored(NodeId),
}

/// Broken layout graph invariant
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Index and node sequence disagree in size
    #[error("Entity indices do not match the node sequence")]
    IndexMismatch,

    /// Node's entity is indexed to another node
    #[error("Entity of node {0:?} is shown more than once")]
    DuplicateEntity(NodeId),

    /// Adjacency refers to a removed node
    #[error("Node {node:?} links to missing node {neighbor:?}")]
    DanglingLink {
        /// Node holding the link
        node: NodeId,
        /// Missing node
        neighbor: NodeId,
    },

    /// Node shows an entity the domain graph does not have
    #[error("Node {0:?} shows an entity missing from the domain")]
    UnknownEntity(NodeId),

    /// Shown thing of a shown transformation is not linked to it
    #[error("Transformation node {transformation:?} is not linked to thing node {thing:?}")]
    MissingLink {
        /// Transformation node
        transformation: NodeId,
        /// Thing node
        thing: NodeId,
    },

    /// Link present in one direction only
    #[error("Link from {node:?} to {neighbor:?} has no back link")]
    AsymmetricLink {
        /// Node holding the link
        node: NodeId,
        /// Node lacking the back link
        neighbor: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, TransformationDef};

    fn domain() -> DomainGraph {
        DomainGraph::from_dataset(Dataset {
            transformations: vec![
                TransformationDef::new("smelt")
                    .with_ingredients(["ore"])
                    .with_products(["plate"]),
                TransformationDef::new("gear")
                    .with_ingredients(["plate"])
                    .with_products(["gear"]),
                TransformationDef::new("unrelated").with_products(["rock"]),
            ],
            ..Dataset::default()
        })
        .unwrap()
    }

    fn uniform_sizes(pending: &PendingInsertion) -> HashMap<NodeId, Vec2> {
        pending
            .nodes()
            .iter()
            .map(|id| (*id, Vec2::new(100.0, 40.0)))
            .collect()
    }

    #[test]
    fn test_add_creates_and_links() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let smelt = domain.transformation_by_name("smelt").unwrap();

        let pending = graph.add_transformation(&domain, smelt).unwrap();
        assert_eq!(pending.nodes().len(), 3);
        assert!(pending.into_empty());

        let root = graph.node(pending.root()).unwrap();
        assert_eq!(root.left_neighbors.len(), 1);
        assert_eq!(root.right_neighbors.len(), 1);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_validate_with_domain_finds_missing_links() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let smelt = domain.transformation_by_name("smelt").unwrap();
        let gear = domain.transformation_by_name("gear").unwrap();
        graph.add_transformation(&domain, smelt).unwrap();
        let gear_node = graph.add_transformation(&domain, gear).unwrap().root();
        assert!(graph.validate_with(&domain).is_ok());

        let plate = graph
            .thing_node(domain.thing_by_name("plate").unwrap())
            .unwrap();
        graph.unlink(plate, gear_node);

        // Still symmetric, but the shown plate is no longer an ingredient
        assert!(graph.validate().is_ok());
        assert_eq!(
            graph.validate_with(&domain),
            Err(InvariantViolation::MissingLink {
                transformation: gear_node,
                thing: plate,
            })
        );
    }

    #[test]
    fn test_add_twice_is_rejected_without_mutation() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let smelt = domain.transformation_by_name("smelt").unwrap();
        graph.add_transformation(&domain, smelt).unwrap();
        let revision = graph.revision();

        assert!(matches!(
            graph.add_transformation(&domain, smelt),
            Err(LayoutError::AlreadyPresent { .. })
        ));
        assert_eq!(graph.revision(), revision);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_disconnected_add_is_rejected() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        graph
            .add_transformation(&domain, domain.transformation_by_name("smelt").unwrap())
            .unwrap();
        let unrelated = domain.transformation_by_name("unrelated").unwrap();
        assert!(matches!(
            graph.add_transformation(&domain, unrelated),
            Err(LayoutError::Disconnected(_))
        ));
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_assign_positions_requires_sizes() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let pending = graph
            .add_transformation(&domain, domain.transformation_by_name("smelt").unwrap())
            .unwrap();

        let mut sizes = uniform_sizes(&pending);
        sizes.remove(&pending.nodes()[2]);
        assert!(matches!(
            graph.assign_positions(&pending, &sizes, Vec2::new(800.0, 600.0)),
            Err(LayoutError::Unmeasured(_))
        ));
        assert!(graph.nodes().all(|n| n.position == Pos2::ZERO && n.size.is_none()));
    }

    #[test]
    fn test_reused_thing_anchors_next_insertion() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let pending = graph
            .add_transformation(&domain, domain.transformation_by_name("smelt").unwrap())
            .unwrap();
        graph
            .assign_positions(&pending, &uniform_sizes(&pending), Vec2::new(800.0, 600.0))
            .unwrap();

        let plate = graph.thing_node(domain.thing_by_name("plate").unwrap()).unwrap();
        let plate_rect = graph.node(plate).unwrap().rect().unwrap();

        let pending = graph
            .add_transformation(&domain, domain.transformation_by_name("gear").unwrap())
            .unwrap();
        assert!(!pending.into_empty());
        assert_eq!(pending.nodes().len(), 2);
        graph
            .assign_positions(&pending, &uniform_sizes(&pending), Vec2::new(800.0, 600.0))
            .unwrap();

        let gear_recipe = graph.node(pending.root()).unwrap();
        assert_eq!(gear_recipe.position.x, plate_rect.right() + 50.0);
        assert_eq!(gear_recipe.position.y, plate_rect.top());
    }

    #[test]
    fn test_right_only_placement_keeps_gap() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let pending = graph
            .add_transformation(&domain, domain.transformation_by_name("smelt").unwrap())
            .unwrap();
        let mut sizes = uniform_sizes(&pending);
        sizes.insert(pending.nodes()[1], Vec2::new(60.0, 30.0));
        graph
            .assign_positions(&pending, &sizes, Vec2::new(800.0, 600.0))
            .unwrap();

        let root = graph.node(pending.root()).unwrap().rect().unwrap();
        let ore = graph.node(pending.nodes()[1]).unwrap().rect().unwrap();
        assert_eq!(ore.right(), root.left() - 50.0);
        assert_eq!(ore.top(), root.top());
    }

    #[test]
    fn test_remove_prunes_orphans_only() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let smelt = graph
            .add_transformation(&domain, domain.transformation_by_name("smelt").unwrap())
            .unwrap()
            .root();
        let gear = graph
            .add_transformation(&domain, domain.transformation_by_name("gear").unwrap())
            .unwrap()
            .root();
        assert_eq!(graph.node_count(), 5);

        let removed = graph.remove_transformation(gear).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.node_count(), 3);
        assert!(graph.thing_node(domain.thing_by_name("plate").unwrap()).is_some());
        assert!(graph.thing_node(domain.thing_by_name("gear").unwrap()).is_none());

        assert!(matches!(
            graph.remove_transformation(removed[1]),
            Err(LayoutError::UnknownNode(_))
        ));
        let plate = graph.thing_node(domain.thing_by_name("plate").unwrap()).unwrap();
        assert!(matches!(
            graph.remove_transformation(plate),
            Err(LayoutError::NotATransformation(_))
        ));

        graph.remove_transformation(smelt).unwrap();
        assert!(graph.is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_next_addable() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let pending = graph
            .add_transformation(&domain, domain.transformation_by_name("smelt").unwrap())
            .unwrap();
        let plate = graph.thing_node(domain.thing_by_name("plate").unwrap()).unwrap();

        assert_eq!(graph.next_addable(&domain, plate, Side::Left), None);
        assert_eq!(
            graph.next_addable(&domain, plate, Side::Right),
            domain.transformation_by_name("gear")
        );
        assert_eq!(graph.next_addable(&domain, pending.root(), Side::Right), None);
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let domain = DomainGraph::from_dataset(Dataset {
            transformations: vec![TransformationDef::new("enrich")
                .with_ingredients(["u235", "u238"])
                .with_products(["u235"])],
            ..Dataset::default()
        })
        .unwrap();
        let mut graph = LayoutGraph::default();
        let pending = graph
            .add_transformation(&domain, TransformationId(0))
            .unwrap();
        assert_eq!(pending.nodes().len(), 3);

        let edges = graph.edges();
        assert_eq!(edges.len(), 3);
        let u235 = graph.thing_node(domain.thing_by_name("u235").unwrap()).unwrap();
        let node = graph.node(u235).unwrap();
        assert_eq!(node.left_neighbors, vec![pending.root()]);
        assert_eq!(node.right_neighbors, vec![pending.root()]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_set_position_bumps_revision_on_change() {
        let domain = domain();
        let mut graph = LayoutGraph::default();
        let root = graph
            .add_transformation(&domain, TransformationId(0))
            .unwrap()
            .root();
        let revision = graph.revision();

        graph.set_position(root, Pos2::ZERO).unwrap();
        assert_eq!(graph.revision(), revision);
        graph.set_position(root, Pos2::new(5.0, 5.0)).unwrap();
        assert_eq!(graph.revision(), revision + 1);
        assert!(graph.set_position(NodeId(99), Pos2::ZERO).is_err());
    }

    #[test]
    fn test_overlap_padding() {
        let a = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let below = Rect::from_min_size(Pos2::new(0.0, 25.0), Vec2::new(10.0, 10.0));
        let beside = Rect::from_min_size(Pos2::new(20.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(overlaps(below, a, 20.0));
        assert!(!overlaps(below, a, 10.0));
        assert!(!overlaps(beside, a, 20.0));
    }
}
