// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interaction controller: drag state machine and insert/remove gestures.
//!
//! The controller is the only owner of the [`LayoutGraph`]. Views read the
//! graph through it and turn user input into calls on it.

use crate::domain::{DomainGraph, TransformationId};
use crate::layout::{LayoutError, LayoutGraph, LayoutSettings, PendingInsertion};
use crate::node::{NodeId, Side};
use crate::sizing::SizeObserver;
use egui::{Pos2, Vec2};
use std::collections::HashMap;
use std::sync::Arc;

/// Pointer state of the controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress
    #[default]
    Idle,
    /// A single node follows the pointer
    Dragging {
        /// Dragged node
        node: NodeId,
        /// Node position when the drag started
        start_position: Pos2,
        /// Pointer position when the drag started
        start_pointer: Pos2,
    },
}

/// Owns the layout graph and applies gestures to it
#[derive(Debug)]
pub struct InteractionController {
    graph: LayoutGraph,
    domain: Arc<DomainGraph>,
    /// Transformation name overriding the dataset's default on reset
    default_override: Option<String>,
    drag: DragState,
    pending: Option<PendingInsertion>,
    container: SizeObserver,
    bootstrapped: bool,
}

impl InteractionController {
    /// Create a controller with an empty graph. The graph is filled on the
    /// first container measurement or domain swap.
    pub fn new(domain: Arc<DomainGraph>, settings: LayoutSettings) -> Self {
        Self {
            graph: LayoutGraph::new(settings),
            domain,
            default_override: None,
            drag: DragState::Idle,
            pending: None,
            container: SizeObserver::new(),
            bootstrapped: false,
        }
    }

    /// Use a named transformation as the starting point instead of the
    /// dataset's default
    pub fn with_default_transformation(mut self, name: Option<String>) -> Self {
        self.default_override = name;
        self
    }

    /// The layout graph
    pub fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    /// The domain graph
    pub fn domain(&self) -> &DomainGraph {
        &self.domain
    }

    /// Current drag state
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Insertion waiting for measurement, if any
    pub fn pending(&self) -> Option<&PendingInsertion> {
        self.pending.as_ref()
    }

    /// Check if a structural change is still waiting for measurement
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed the layout surface size. The first real measurement resets the
    /// graph to the default transformation. Returns whether the size changed.
    pub fn observe_container(&mut self, size: Vec2) -> Result<bool, InteractionError> {
        if self.container.observe(size).is_none() {
            return Ok(false);
        }
        if !self.bootstrapped {
            self.reset()?;
        }
        Ok(true)
    }

    /// Replace the domain graph and start over
    pub fn set_domain(&mut self, domain: Arc<DomainGraph>) -> Result<(), InteractionError> {
        tracing::info!(
            "Switching domain ({} things, {} transformations)",
            domain.thing_count(),
            domain.transformation_count()
        );
        self.domain = domain;
        self.reset()
    }

    /// Clear the graph and insert the default transformation
    pub fn reset(&mut self) -> Result<(), InteractionError> {
        self.graph.clear();
        self.drag = DragState::Idle;
        self.pending = None;
        self.bootstrapped = true;

        let start = match &self.default_override {
            Some(name) => match self.domain.transformation_by_name(name) {
                Some(id) => Some(id),
                None => {
                    tracing::warn!("Default transformation {name} not found, using dataset default");
                    self.domain.default_transformation()
                }
            },
            None => self.domain.default_transformation(),
        };

        match start {
            Some(transformation) => self.add_transformation(transformation),
            None => {
                tracing::info!("Domain has no transformations, view left empty");
                Ok(())
            }
        }
    }

    /// Insert a transformation. Its nodes stay pending until
    /// [`Self::complete_insertion`] receives their sizes.
    pub fn add_transformation(
        &mut self,
        transformation: TransformationId,
    ) -> Result<(), InteractionError> {
        if self.pending.is_some() {
            return Err(InteractionError::InsertionPending);
        }
        let pending = self.graph.add_transformation(&self.domain, transformation)?;
        self.pending = Some(pending);
        Ok(())
    }

    /// Place the pending nodes using their measured sizes
    pub fn complete_insertion(&mut self, sizes: &HashMap<NodeId, Vec2>) -> Result<(), InteractionError> {
        let pending = self.pending.as_ref().ok_or(InteractionError::NothingPending)?;
        let container = self
            .container
            .size()
            .ok_or(InteractionError::ContainerUnmeasured)?;
        self.graph.assign_positions(pending, sizes, container)?;
        self.pending = None;
        Ok(())
    }

    /// Check if the "+" button on one side of a thing node has anything to add
    pub fn can_extend(&self, node: NodeId, side: Side) -> bool {
        self.pending.is_none() && self.graph.next_addable(&self.domain, node, side).is_some()
    }

    /// Pull in the next producer ([`Side::Left`]) or consumer
    /// ([`Side::Right`]) of a thing node
    pub fn extend(&mut self, node: NodeId, side: Side) -> Result<TransformationId, InteractionError> {
        if self.pending.is_some() {
            return Err(InteractionError::InsertionPending);
        }
        let transformation = self
            .graph
            .next_addable(&self.domain, node, side)
            .ok_or(InteractionError::NothingToAdd { node, side })?;
        tracing::debug!("Extending {:?} on the {:?} side", node, side);
        self.add_transformation(transformation)?;
        Ok(transformation)
    }

    /// Remove a transformation node and prune orphaned things
    pub fn remove_transformation(&mut self, node: NodeId) -> Result<Vec<NodeId>, InteractionError> {
        if self.pending.is_some() {
            return Err(InteractionError::InsertionPending);
        }
        let removed = self.graph.remove_transformation(node)?;
        if let DragState::Dragging { node, .. } = self.drag {
            if removed.contains(&node) {
                self.drag = DragState::Idle;
            }
        }
        Ok(removed)
    }

    /// Record a node's measured size
    pub fn record_size(&mut self, node: NodeId, size: Vec2) -> Result<(), InteractionError> {
        Ok(self.graph.set_measured_size(node, size)?)
    }

    /// Start dragging a node
    pub fn pointer_down(&mut self, node: NodeId, pointer: Pos2) -> Result<(), InteractionError> {
        let start_position = self
            .graph
            .node(node)
            .ok_or(LayoutError::UnknownNode(node))?
            .position;
        tracing::debug!("Drag start on {:?} at {:?}", node, pointer);
        self.drag = DragState::Dragging {
            node,
            start_position,
            start_pointer: pointer,
        };
        Ok(())
    }

    /// Move the dragged node with the pointer, kept inside the container.
    /// Returns the new position.
    pub fn pointer_move(&mut self, pointer: Pos2) -> Result<Pos2, InteractionError> {
        let DragState::Dragging {
            node,
            start_position,
            start_pointer,
        } = self.drag
        else {
            return Err(InteractionError::NotDragging);
        };
        let container = self
            .container
            .size()
            .ok_or(InteractionError::ContainerUnmeasured)?;
        let size = self
            .graph
            .node(node)
            .ok_or(LayoutError::UnknownNode(node))?
            .size
            .unwrap_or(Vec2::ZERO);

        let limit = (container - size).max(Vec2::ZERO);
        let target = start_position + (pointer - start_pointer);
        let position = Pos2::new(target.x.clamp(0.0, limit.x), target.y.clamp(0.0, limit.y));
        self.graph.set_position(node, position)?;
        Ok(position)
    }

    /// Release the pointer
    pub fn pointer_up(&mut self) {
        if let DragState::Dragging { node, .. } = self.drag {
            tracing::debug!("Drag end on {:?}", node);
        }
        self.drag = DragState::Idle;
    }

    /// Pointer left the surface
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }
}

/// Error from a gesture the view should not have offered
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    /// Layout graph rejected the change
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Another insertion is still waiting for measurement
    #[error("An insertion is still waiting for measurement")]
    InsertionPending,

    /// No insertion is waiting
    #[error("No insertion is waiting for measurement")]
    NothingPending,

    /// Nothing left to add on that side of the node
    #[error("Nothing left to add on the {side:?} side of {node:?}")]
    NothingToAdd {
        /// Thing node
        node: NodeId,
        /// Requested side
        side: Side,
    },

    /// Pointer moved without an active drag
    #[error("No drag in progress")]
    NotDragging,

    /// Layout surface has not been measured yet
    #[error("Layout surface has not been measured")]
    ContainerUnmeasured,
}
