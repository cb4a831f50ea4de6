// SPDX-License-Identifier: MIT OR Apache-2.0
//! Icon loading and caching for node cards.
//!
//! Image references from the dataset are resolved against the dataset's
//! directory, decoded with the `image` crate and uploaded as egui textures.
//! Failed loads are remembered so each bad reference is reported once.

use craftflow_graph::IconProvider;
use image::{DynamicImage, GenericImageView};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Largest icon side uploaded to the GPU
pub const MAX_ICON_SIZE: u32 = 64;

/// Errors that can occur while loading an icon
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Image decoding error
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Texture cache keyed by image reference
pub struct IconCache {
    /// Directory references are relative to
    base_dir: PathBuf,
    /// Loaded textures, `None` for references that failed
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl IconCache {
    /// Create an empty cache resolving references against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            textures: HashMap::new(),
        }
    }

    /// Resolve references against another directory, dropping every texture
    pub fn set_base_dir(&mut self, base_dir: impl Into<PathBuf>) {
        self.base_dir = base_dir.into();
        self.clear();
    }

    /// Drop every texture and forget failures
    pub fn clear(&mut self) {
        self.textures.clear();
    }

    #[cfg(test)]
    fn failed_count(&self) -> usize {
        self.textures.values().filter(|t| t.is_none()).count()
    }

    fn resolve(&self, image: &str) -> PathBuf {
        let path = Path::new(image);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl IconProvider for IconCache {
    fn icon(&mut self, ctx: &egui::Context, image: &str) -> Option<egui::TextureId> {
        if let Some(entry) = self.textures.get(image) {
            return entry.as_ref().map(egui::TextureHandle::id);
        }

        let path = self.resolve(image);
        let entry = match load_color_image(&path) {
            Ok(color_image) => {
                tracing::debug!("Loaded icon {:?}", path);
                Some(ctx.load_texture(image, color_image, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                tracing::warn!("Failed to load icon {:?}: {e}", path);
                None
            }
        };
        let id = entry.as_ref().map(egui::TextureHandle::id);
        self.textures.insert(image.to_string(), entry);
        id
    }
}

/// Decode an image file into an egui image no larger than [`MAX_ICON_SIZE`]
fn load_color_image(path: &Path) -> Result<egui::ColorImage, IconError> {
    let data = std::fs::read(path)?;
    let img = shrink(image::load_from_memory(&data)?, MAX_ICON_SIZE);
    let (width, height) = img.dimensions();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        &img.to_rgba8().into_raw(),
    ))
}

/// Scale down keeping the aspect ratio
fn shrink(img: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_size && height <= max_size {
        return img;
    }
    img.resize(max_size, max_size, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_icon_is_cached_as_failure() {
        let ctx = egui::Context::default();
        let mut cache = IconCache::new(std::env::temp_dir().join("craftflow-no-such-dir"));
        assert!(cache.icon(&ctx, "missing.png").is_none());
        assert!(cache.icon(&ctx, "missing.png").is_none());
        assert_eq!(cache.failed_count(), 1);

        cache.clear();
        assert_eq!(cache.failed_count(), 0);
    }

    #[test]
    fn test_loads_relative_to_base_dir() {
        let dir = std::env::temp_dir().join(format!("craftflow-icons-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::from_pixel(128, 32, image::Rgba([200, 100, 50, 255]))
            .save(dir.join("plate.png"))
            .unwrap();

        let ctx = egui::Context::default();
        let mut cache = IconCache::new(&dir);
        let first = cache.icon(&ctx, "plate.png");
        let second = cache.icon(&ctx, "plate.png");
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(cache.failed_count(), 0);
    }

    #[test]
    fn test_shrink_keeps_aspect_ratio() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(256, 128));
        assert_eq!(shrink(img, 64).dimensions(), (64, 32));

        let small = DynamicImage::ImageRgba8(image::RgbaImage::new(16, 16));
        assert_eq!(shrink(small, 64).dimensions(), (16, 16));
    }
}
