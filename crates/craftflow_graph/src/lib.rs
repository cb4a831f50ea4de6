// SPDX-License-Identifier: MIT OR Apache-2.0
//! Incremental production chain layout for Craftflow.
//!
//! This crate turns a catalog of things and transformations into an
//! interactive left-to-right graph that grows one transformation at a time.
//!
//! ## Architecture
//!
//! - [`domain`]: immutable catalog with name lookup and back references
//! - [`layout`]: visual nodes, adjacency, greedy placement and pruning
//! - [`interaction`]: drag state machine and insert/remove gestures
//! - [`render`]: cached edge curves, recomputed on change
//! - [`ui`]: egui view tying everything together

pub mod domain;
pub mod edge;
pub mod interaction;
pub mod layout;
pub mod node;
pub mod render;
pub mod sizing;
pub mod ui;

pub use domain::{Dataset, DomainError, DomainGraph, ThingId, TransformationId};
pub use edge::{Edge, EdgeCurve};
pub use interaction::{DragState, InteractionController, InteractionError};
pub use layout::{LayoutError, LayoutGraph, LayoutSettings, PendingInsertion};
pub use node::{NodeContent, NodeId, Side, VisualNode};
pub use render::RenderLoop;
pub use sizing::SizeObserver;
pub use ui::{ChainView, IconProvider, NoIcons};
