// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual nodes of the layout graph.

use crate::domain::{ThingId, TransformationId};
use egui::{Pos2, Rect, Vec2};

/// Identifier of a visual node.
///
/// Ids are handed out in increasing order and never reused, so comparing two
/// ids compares their position in the node sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Domain entity shown by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeContent {
    /// An item or fluid
    Thing(ThingId),
    /// A recipe
    Transformation(TransformationId),
}

/// Horizontal side of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Nodes feeding into this one
    Left,
    /// Nodes this one feeds into
    Right,
}

impl Side {
    /// The other side
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A thing or transformation placed on the layout surface
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    /// Node id
    pub id: NodeId,
    /// Shown entity
    pub content: NodeContent,
    /// Top-left corner in surface coordinates
    pub position: Pos2,
    /// Last measured size, `None` until the node has been laid out once
    pub size: Option<Vec2>,
    /// Nodes feeding into this node
    pub left_neighbors: Vec<NodeId>,
    /// Nodes this node feeds into
    pub right_neighbors: Vec<NodeId>,
}

impl VisualNode {
    pub(crate) fn new(id: NodeId, content: NodeContent) -> Self {
        Self {
            id,
            content,
            position: Pos2::ZERO,
            size: None,
            left_neighbors: Vec::new(),
            right_neighbors: Vec::new(),
        }
    }

    /// Check if this node shows a thing
    pub fn is_thing(&self) -> bool {
        matches!(self.content, NodeContent::Thing(_))
    }

    /// Check if this node shows a transformation
    pub fn is_transformation(&self) -> bool {
        matches!(self.content, NodeContent::Transformation(_))
    }

    /// Bounding rectangle, once measured
    pub fn rect(&self) -> Option<Rect> {
        self.size.map(|size| Rect::from_min_size(self.position, size))
    }

    /// Neighbors on one side
    pub fn neighbors(&self, side: Side) -> &[NodeId] {
        match side {
            Side::Left => &self.left_neighbors,
            Side::Right => &self.right_neighbors,
        }
    }

    pub(crate) fn neighbors_mut(&mut self, side: Side) -> &mut Vec<NodeId> {
        match side {
            Side::Left => &mut self.left_neighbors,
            Side::Right => &mut self.right_neighbors,
        }
    }

    /// Neighbors on both sides, left first
    pub fn all_neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.left_neighbors
            .iter()
            .chain(self.right_neighbors.iter())
            .copied()
    }

    /// Check if the node has no neighbors at all
    pub fn is_isolated(&self) -> bool {
        self.left_neighbors.is_empty() && self.right_neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_follow_creation_order() {
        assert!(NodeId(3) < NodeId(10));
    }

    #[test]
    fn test_rect_requires_measurement() {
        let mut node = VisualNode::new(NodeId(0), NodeContent::Thing(ThingId(0)));
        assert!(node.rect().is_none());
        node.position = Pos2::new(10.0, 20.0);
        node.size = Some(Vec2::new(100.0, 40.0));
        let rect = node.rect().unwrap();
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 60.0);
    }

    #[test]
    fn test_neighbors_by_side() {
        let mut node = VisualNode::new(NodeId(0), NodeContent::Thing(ThingId(0)));
        node.neighbors_mut(Side::Left).push(NodeId(1));
        node.neighbors_mut(Side::Left.opposite()).push(NodeId(2));
        assert_eq!(node.neighbors(Side::Left), &[NodeId(1)]);
        assert_eq!(node.neighbors(Side::Right), &[NodeId(2)]);
        assert_eq!(node.all_neighbors().collect::<Vec<_>>(), vec![NodeId(1), NodeId(2)]);
        assert!(!node.is_isolated());
    }
}
