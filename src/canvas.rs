//! Output canvas - where selected sprites get drawn.

use crate::grid::{Cell, Rect};
use crate::select::TileSelection;
use crate::tileset::TileBank;
use crate::{Result, WeaverError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

/// One sprite placement produced by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDraw {
    pub cell: Cell,
    /// Destination in canvas pixels.
    pub dest: Rect,
    pub selection: TileSelection,
}

/// Destination for sprite draws.
pub trait Renderer {
    /// Reset the whole canvas to its background.
    fn clear(&mut self);

    /// Match the canvas to a new grid; contents are not preserved.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw the selected sprite scaled into `draw.dest`.
    fn draw(&mut self, draw: &TileDraw, bank: &TileBank) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SpriteKey {
    tileset: usize,
    source: Rect,
    width: u32,
    height: u32,
}

/// In-memory RGBA canvas backed by the `image` crate.
pub struct ImageCanvas {
    image: RgbaImage,
    background: Rgba<u8>,
    filter: FilterType,
    // resized sprites, reused across cells of the same size
    sprites: HashMap<SpriteKey, RgbaImage>,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32, background: Rgba<u8>, filter: FilterType) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
            background,
            filter,
            sprites: HashMap::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Write the canvas to `path`; the format follows the extension.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let opaque_only = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
            .unwrap_or(false);
        if opaque_only {
            DynamicImage::ImageRgba8(self.image.clone()).to_rgb8().save(path)?;
        } else {
            self.image.save(path)?;
        }
        log::info!("Saved mosaic to {}", path.display());
        Ok(())
    }

    fn cached_sprite<'a>(
        sprites: &'a mut HashMap<SpriteKey, RgbaImage>,
        filter: FilterType,
        draw: &TileDraw,
        bank: &TileBank,
    ) -> Result<&'a RgbaImage> {
        let source = draw.selection.source;
        let key = SpriteKey {
            tileset: draw.selection.tileset,
            source,
            width: draw.dest.width,
            height: draw.dest.height,
        };
        if !sprites.contains_key(&key) {
            let tileset = bank.get(key.tileset).ok_or_else(|| {
                WeaverError::Config(format!("tileset index {} out of range", key.tileset))
            })?;
            let sheet = tileset.image();
            if source.clamp_to(sheet.width(), sheet.height()) != source {
                return Err(WeaverError::Config(format!(
                    "sprite {source:?} lies outside tileset {}",
                    key.tileset
                )));
            }
            let cropped =
                imageops::crop_imm(sheet, source.x, source.y, source.width, source.height).to_image();
            let sprite = if (source.width, source.height) == (key.width, key.height) {
                cropped
            } else {
                imageops::resize(&cropped, key.width, key.height, filter)
            };
            sprites.insert(key, sprite);
        }
        Ok(&sprites[&key])
    }
}

impl Renderer for ImageCanvas {
    fn clear(&mut self) {
        let background = self.background;
        self.image.pixels_mut().for_each(|p| *p = background);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::from_pixel(width, height, self.background);
            self.sprites.clear();
        }
    }

    fn draw(&mut self, draw: &TileDraw, bank: &TileBank) -> Result<()> {
        if draw.dest.area() == 0 {
            return Ok(());
        }
        let sprite = Self::cached_sprite(&mut self.sprites, self.filter, draw, bank)?;
        // overlay clips at the canvas edge, which trims partial cells
        imageops::overlay(&mut self.image, sprite, draw.dest.x as i64, draw.dest.y as i64);
        Ok(())
    }
}
