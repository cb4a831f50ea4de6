// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edges between visual nodes and their connector curves.

use crate::node::NodeId;
use egui::{Pos2, Rect, Vec2};

/// A left-to-right link between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Origin node (the left end)
    pub from: NodeId,
    /// Destination node (the right end)
    pub to: NodeId,
}

impl Edge {
    /// Create a new edge
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

/// Cubic Bezier from the right-center anchor of one node to the left-center
/// anchor of another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCurve {
    /// Edge this curve draws
    pub edge: Edge,
    /// Start anchor
    pub from: Pos2,
    /// First control point
    pub ctrl_from: Pos2,
    /// Second control point
    pub ctrl_to: Pos2,
    /// End anchor
    pub to: Pos2,
}

impl EdgeCurve {
    /// Build the curve between two node rectangles, with control points
    /// `offset` units horizontally outward from each anchor
    pub fn between(edge: Edge, origin: Rect, destination: Rect, offset: f32) -> Self {
        let from = origin.right_center();
        let to = destination.left_center();
        Self {
            edge,
            from,
            ctrl_from: from + Vec2::new(offset, 0.0),
            ctrl_to: to - Vec2::new(offset, 0.0),
            to,
        }
    }

    /// Point on the curve at `t` in `[0, 1]`
    pub fn point_at(&self, t: f32) -> Pos2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.from.x
            + 3.0 * mt2 * t * self.ctrl_from.x
            + 3.0 * mt * t2 * self.ctrl_to.x
            + t3 * self.to.x;
        let y = mt3 * self.from.y
            + 3.0 * mt2 * t * self.ctrl_from.y
            + 3.0 * mt * t2 * self.ctrl_to.y
            + t3 * self.to.y;
        Pos2::new(x, y)
    }

    /// Flatten the curve into `segments + 1` points
    pub fn points(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    /// Same curve shifted by `offset`
    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            edge: self.edge,
            from: self.from + offset,
            ctrl_from: self.ctrl_from + offset,
            ctrl_to: self.ctrl_to + offset,
            to: self.to + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EdgeCurve {
        EdgeCurve::between(
            Edge::new(NodeId(0), NodeId(1)),
            Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 40.0)),
            Rect::from_min_size(Pos2::new(200.0, 100.0), Vec2::new(80.0, 20.0)),
            50.0,
        )
    }

    #[test]
    fn test_anchors_and_controls() {
        let curve = sample();
        assert_eq!(curve.from, Pos2::new(100.0, 20.0));
        assert_eq!(curve.to, Pos2::new(200.0, 110.0));
        assert_eq!(curve.ctrl_from, Pos2::new(150.0, 20.0));
        assert_eq!(curve.ctrl_to, Pos2::new(150.0, 110.0));
    }

    #[test]
    fn test_curve_endpoints() {
        let curve = sample();
        assert_eq!(curve.point_at(0.0), curve.from);
        assert_eq!(curve.point_at(1.0), curve.to);

        let points = curve.points(32);
        assert_eq!(points.len(), 33);
        assert_eq!(points[0], curve.from);
        assert_eq!(points[32], curve.to);
    }
}
