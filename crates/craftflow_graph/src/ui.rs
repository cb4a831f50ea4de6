// SPDX-License-Identifier: MIT OR Apache-2.0
//! Production chain view.
//!
//! Features:
//! - Edge curves painted below the nodes
//! - Thing cards with "+" buttons to pull in producers and consumers
//! - Transformation cards with crafter icons and a remove button
//! - Single node dragging, clamped to the surface
//! - One-frame measurement of newly inserted nodes before they are placed

use crate::domain::{DomainGraph, ThingId, TransformationId};
use crate::interaction::{DragState, InteractionController};
use crate::node::{NodeContent, NodeId, Side, VisualNode};
use crate::render::RenderLoop;
use egui::{Color32, Pos2, Rect, Sense, Stroke, UiBuilder, Vec2};
use std::collections::HashMap;
use std::sync::Arc;

/// Node visual dimensions
const ICON_SIZE: f32 = 24.0;
const CRAFTER_ICON_SIZE: f32 = 16.0;
const NODE_ROUNDING: f32 = 6.0;
const NODE_MAX_SIZE: Vec2 = Vec2::new(360.0, 200.0);

const SURFACE_COLOR: Color32 = Color32::from_rgb(30, 31, 34);
const THING_FILL: Color32 = Color32::from_rgb(48, 52, 60);
const TRANSFORMATION_FILL: Color32 = Color32::from_rgb(62, 54, 44);

/// Source of textures for dataset image references
pub trait IconProvider {
    /// Texture for an image reference, if it can be loaded
    fn icon(&mut self, ctx: &egui::Context, image: &str) -> Option<egui::TextureId>;
}

/// Icon provider that never has an icon
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconProvider for NoIcons {
    fn icon(&mut self, _ctx: &egui::Context, _image: &str) -> Option<egui::TextureId> {
        None
    }
}

/// Gesture collected while drawing a frame
#[derive(Debug, Clone, Copy)]
enum NodeAction {
    DragStart { node: NodeId, pointer: Pos2 },
    Extend(NodeId, Side),
    Remove(NodeId),
}

/// Interactive view of a production chain
#[derive(Debug)]
pub struct ChainView {
    controller: InteractionController,
    render: RenderLoop,
}

impl ChainView {
    /// Create a view around a controller
    pub fn new(controller: InteractionController) -> Self {
        Self {
            controller,
            render: RenderLoop::new(),
        }
    }

    /// The interaction controller
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Mutable access to the interaction controller
    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    /// Swap the domain graph and start over from its default transformation
    pub fn set_domain(&mut self, domain: Arc<DomainGraph>) {
        if let Err(e) = self.controller.set_domain(domain) {
            tracing::error!("Failed to reset view: {e}");
        }
        self.render.invalidate();
    }

    /// Clear the view and start over from the default transformation
    pub fn reset(&mut self) {
        if let Err(e) = self.controller.reset() {
            tracing::error!("Failed to reset view: {e}");
        }
    }

    /// Render the view into all remaining space of `ui`
    pub fn ui(&mut self, ui: &mut egui::Ui, icons: &mut dyn IconProvider) {
        let rect = ui.available_rect_before_wrap();
        ui.allocate_rect(rect, Sense::hover());

        if let Err(e) = self.controller.observe_container(rect.size()) {
            tracing::error!("Failed to bootstrap view: {e}");
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, SURFACE_COLOR);

        // Edges first (below nodes)
        self.render.prepare(self.controller.graph(), rect.size());
        self.render.paint(&painter, rect.min.to_vec2());

        let pending = self.controller.pending().cloned();
        let busy = pending.is_some();
        let mut actions = Vec::new();
        let mut controls: Vec<Rect> = Vec::new();
        let mut measured = Vec::new();

        for node in self.controller.graph().nodes() {
            let hidden = pending.as_ref().is_some_and(|p| p.contains(node.id));
            let min = rect.min + node.position.to_vec2();

            // Registered before the card so inner buttons win hit-testing
            if let (false, Some(size)) = (hidden, node.size) {
                let handle = ui.interact(
                    Rect::from_min_size(min, size),
                    ui.id().with(("craftflow_node", node.id.0)),
                    Sense::drag(),
                );
                if handle.drag_started() {
                    if let Some(pointer) = ui.input(|i| i.pointer.press_origin()) {
                        actions.push(NodeAction::DragStart {
                            node: node.id,
                            pointer,
                        });
                    }
                }
            }

            let card = node_card(ui, &self.controller, node, min, hidden, busy, icons, &mut controls);
            actions.extend(card.inner);
            measured.push((node.id, card.response.rect.size(), hidden));
        }

        let mut pending_sizes = HashMap::new();
        for (node, size, hidden) in measured {
            if hidden {
                pending_sizes.insert(node, size);
            } else if let Err(e) = self.controller.record_size(node, size) {
                tracing::error!("Failed to record node size: {e}");
            }
        }
        if busy {
            tracing::debug!("Measured {} new nodes", pending_sizes.len());
            if let Err(e) = self.controller.complete_insertion(&pending_sizes) {
                tracing::error!("Failed to place new nodes: {e}");
            }
            ui.ctx().request_repaint();
        }

        for action in actions {
            let result = match action {
                NodeAction::DragStart { node, pointer } => {
                    if controls.iter().any(|r| r.contains(pointer)) {
                        continue;
                    }
                    self.controller.pointer_down(node, pointer)
                }
                NodeAction::Extend(node, side) => self.controller.extend(node, side).map(|_| ()),
                NodeAction::Remove(node) => self.controller.remove_transformation(node).map(|_| ()),
            };
            if let Err(e) = result {
                tracing::error!("Rejected gesture: {e}");
            }
            ui.ctx().request_repaint();
        }

        self.update_drag(ui, rect);
        self.draw_status_bar(ui, rect);
    }

    fn update_drag(&mut self, ui: &egui::Ui, rect: Rect) {
        if self.controller.drag_state() == DragState::Idle {
            return;
        }

        let (down, hover) = ui.input(|i| (i.pointer.primary_down(), i.pointer.hover_pos()));
        match hover {
            Some(pointer) if down && rect.contains(pointer) => {
                if let Err(e) = self.controller.pointer_move(pointer) {
                    tracing::error!("Drag failed: {e}");
                    self.controller.pointer_up();
                }
            }
            Some(_) if !down => self.controller.pointer_up(),
            _ => self.controller.pointer_leave(),
        }
    }

    fn draw_status_bar(&self, ui: &egui::Ui, rect: Rect) {
        let graph = self.controller.graph();
        let things = graph.nodes().filter(|n| n.is_thing()).count();

        ui.painter().text(
            Pos2::new(rect.left() + 6.0, rect.bottom() - 10.0),
            egui::Align2::LEFT_CENTER,
            format!(
                "Things: {} | Recipes: {} | Edges: {}",
                things,
                graph.node_count() - things,
                self.render.curves().len(),
            ),
            egui::FontId::proportional(11.0),
            Color32::from_gray(150),
        );
    }
}

/// Lay out one node card at `min`. Hidden cards are only measured.
fn node_card(
    ui: &mut egui::Ui,
    controller: &InteractionController,
    node: &VisualNode,
    min: Pos2,
    hidden: bool,
    busy: bool,
    icons: &mut dyn IconProvider,
    controls: &mut Vec<Rect>,
) -> egui::InnerResponse<Option<NodeAction>> {
    let mut builder = UiBuilder::new()
        .id_salt(("craftflow_card", node.id.0))
        .max_rect(Rect::from_min_size(min, NODE_MAX_SIZE))
        .layout(egui::Layout::top_down(egui::Align::Min));
    if hidden {
        builder = builder.invisible();
    }

    let fill = if node.is_thing() {
        THING_FILL
    } else {
        TRANSFORMATION_FILL
    };

    ui.allocate_new_ui(builder, |ui| {
        egui::Frame::none()
            .fill(fill)
            .stroke(Stroke::new(1.0, Color32::from_gray(90)))
            .rounding(NODE_ROUNDING)
            .inner_margin(egui::Margin::symmetric(6.0, 4.0))
            .show(ui, |ui| {
                // One row, so the frame hugs its content
                ui.horizontal(|ui| match node.content {
                    NodeContent::Thing(thing) => thing_contents(ui, controller, node.id, thing, icons, controls),
                    NodeContent::Transformation(transformation) => {
                        transformation_contents(ui, controller.domain(), node.id, transformation, busy, icons, controls)
                    }
                })
                .inner
            })
            .inner
    })
}

fn thing_contents(
    ui: &mut egui::Ui,
    controller: &InteractionController,
    node: NodeId,
    thing: ThingId,
    icons: &mut dyn IconProvider,
    controls: &mut Vec<Rect>,
) -> Option<NodeAction> {
    let Some(thing) = controller.domain().thing(thing) else {
        ui.label("?");
        return None;
    };
    let mut action = None;

    let producer = ui
        .add_enabled(controller.can_extend(node, Side::Left), egui::Button::new("+").small())
        .on_hover_text("Add a recipe producing this")
        .on_disabled_hover_text("Nothing else produces this");
    controls.push(producer.rect);
    if producer.clicked() {
        action = Some(NodeAction::Extend(node, Side::Left));
    }

    icon(ui, icons, thing.image.as_deref(), ICON_SIZE);
    ui.add(egui::Label::new(thing.name.as_str()).selectable(false).extend());

    let consumer = ui
        .add_enabled(controller.can_extend(node, Side::Right), egui::Button::new("+").small())
        .on_hover_text("Add a recipe consuming this")
        .on_disabled_hover_text("Nothing else consumes this");
    controls.push(consumer.rect);
    if consumer.clicked() {
        action = Some(NodeAction::Extend(node, Side::Right));
    }

    action
}

fn transformation_contents(
    ui: &mut egui::Ui,
    domain: &DomainGraph,
    node: NodeId,
    transformation: TransformationId,
    busy: bool,
    icons: &mut dyn IconProvider,
    controls: &mut Vec<Rect>,
) -> Option<NodeAction> {
    let Some(transformation) = domain.transformation(transformation) else {
        ui.label("?");
        return None;
    };

    icon(ui, icons, transformation.image.as_deref(), ICON_SIZE);
    ui.add(egui::Label::new(transformation.name.as_str()).selectable(false).extend());
    for crafter in transformation.crafters.iter().filter_map(|c| domain.crafter(*c)) {
        icon(ui, icons, crafter.image.as_deref(), CRAFTER_ICON_SIZE);
    }

    let remove = ui
        .add_enabled(!busy, egui::Button::new("×").small())
        .on_hover_text("Remove this recipe");
    controls.push(remove.rect);
    remove.clicked().then_some(NodeAction::Remove(node))
}

fn icon(ui: &mut egui::Ui, icons: &mut dyn IconProvider, image: Option<&str>, size: f32) {
    if let Some(texture) = image.and_then(|image| icons.icon(ui.ctx(), image)) {
        ui.add(egui::Image::new((texture, Vec2::splat(size))));
    }
}
