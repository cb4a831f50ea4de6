// SPDX-License-Identifier: MIT OR Apache-2.0
//! Content-size tracking for the layout and drawing surfaces.

use egui::Vec2;

/// Remembers the last content size of a surface and reports changes
#[derive(Debug, Clone, Default)]
pub struct SizeObserver {
    size: Option<Vec2>,
}

impl SizeObserver {
    /// Create an observer that has not seen any size yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed size
    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    /// Feed the current size. Returns the new size when it differs from the
    /// last one. Sizes with a non-positive side are ignored.
    pub fn observe(&mut self, size: Vec2) -> Option<Vec2> {
        if size.x <= 0.0 || size.y <= 0.0 || self.size == Some(size) {
            return None;
        }
        tracing::debug!("Surface resized to {:?}", size);
        self.size = Some(size);
        Some(size)
    }
}
