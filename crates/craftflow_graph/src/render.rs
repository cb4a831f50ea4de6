// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge render loop.
//!
//! Curves are a pure function of the layout graph and the drawing surface
//! size. They are recomputed when the graph revision or the surface size
//! changes and reused otherwise.

use crate::edge::EdgeCurve;
use crate::layout::LayoutGraph;
use crate::sizing::SizeObserver;
use egui::{Color32, Shape, Stroke, Vec2};

/// Number of line segments per painted curve
const CURVE_SEGMENTS: usize = 32;

/// Edge stroke
const EDGE_THICKNESS: f32 = 2.0;
const EDGE_COLOR: Color32 = Color32::from_rgb(150, 160, 175);

/// Derive the connector curve of every edge whose ends have been measured
pub fn edge_curves(graph: &LayoutGraph) -> Vec<EdgeCurve> {
    let offset = graph.settings().curve_offset;
    graph
        .edges()
        .into_iter()
        .filter_map(|edge| {
            let origin = graph.node(edge.from)?.rect()?;
            let destination = graph.node(edge.to)?.rect()?;
            Some(EdgeCurve::between(edge, origin, destination, offset))
        })
        .collect()
}

/// Cached edge curves, refreshed on graph or surface changes
#[derive(Debug, Default)]
pub struct RenderLoop {
    surface: SizeObserver,
    revision: Option<u64>,
    curves: Vec<EdgeCurve>,
    passes: u64,
}

impl RenderLoop {
    /// Create a render loop with nothing computed yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a recomputation on the next [`Self::prepare`]
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    /// Bring the curves up to date with the graph and drawing surface
    pub fn prepare(&mut self, graph: &LayoutGraph, surface: Vec2) -> &[EdgeCurve] {
        let resized = self.surface.observe(surface).is_some();
        if resized || self.revision != Some(graph.revision()) {
            self.curves = edge_curves(graph);
            self.revision = Some(graph.revision());
            self.passes += 1;
            tracing::debug!(
                "Recomputed {} edge curves (revision {}, pass {})",
                self.curves.len(),
                graph.revision(),
                self.passes
            );
        }
        &self.curves
    }

    /// Curves from the last pass
    pub fn curves(&self) -> &[EdgeCurve] {
        &self.curves
    }

    #[cfg(test)]
    fn passes(&self) -> u64 {
        self.passes
    }

    /// Paint the current curves, shifted by the surface origin
    pub fn paint(&self, painter: &egui::Painter, origin: Vec2) {
        let stroke = Stroke::new(EDGE_THICKNESS, EDGE_COLOR);
        for curve in &self.curves {
            let points = curve.translate(origin).points(CURVE_SEGMENTS);
            painter.add(Shape::line(points, stroke));
        }
    }
}
