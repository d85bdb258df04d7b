//! Sprite tilesets - brightness columns by variation rows.

use crate::grid::Rect;
use crate::{Result, WeaverError};
use image::RgbaImage;
use std::path::Path;

/// A sprite sheet of square sprites. Columns run dark to bright, rows are
/// alternative sprites for the same brightness.
#[derive(Debug, Clone)]
pub struct Tileset {
    image: RgbaImage,
    sprite_size: u32,
    columns: u32,
    rows: u32,
}

impl Tileset {
    /// Wrap a decoded sheet. `columns` defaults to every whole sprite across
    /// the sheet; rows are always derived from the sheet height.
    pub fn from_image(image: RgbaImage, sprite_size: u32, columns: Option<u32>) -> Result<Self> {
        if sprite_size == 0 {
            return Err(WeaverError::Config("sprite size must be positive".into()));
        }
        let fit = image.width() / sprite_size;
        let columns = columns.unwrap_or(fit);
        if columns > fit {
            return Err(WeaverError::Config(format!(
                "{columns} columns of {sprite_size}px sprites don't fit a {}px wide tileset",
                image.width()
            )));
        }
        let rows = image.height() / sprite_size;
        if columns == 0 || rows == 0 {
            return Err(WeaverError::EmptyTileset);
        }
        Ok(Self { image, sprite_size, columns, rows })
    }

    pub fn load(path: impl AsRef<Path>, sprite_size: u32, columns: Option<u32>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| WeaverError::AssetLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let tileset = Self::from_image(image.to_rgba8(), sprite_size, columns)?;
        log::debug!(
            "Loaded tileset {}: {}x{} sprites of {}px",
            path.display(),
            tileset.columns,
            tileset.rows,
            sprite_size
        );
        Ok(tileset)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn sprite_size(&self) -> u32 {
        self.sprite_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Source rectangle of the sprite at (column, row).
    pub fn sprite_rect(&self, column: u32, row: u32) -> Rect {
        Rect::new(
            column * self.sprite_size,
            row * self.sprite_size,
            self.sprite_size,
            self.sprite_size,
        )
    }
}

/// Ordered, non-empty set of tilesets a session can draw from.
#[derive(Debug, Clone)]
pub struct TileBank {
    tilesets: Vec<Tileset>,
}

impl TileBank {
    pub fn new(tilesets: Vec<Tileset>) -> Result<Self> {
        if tilesets.is_empty() {
            return Err(WeaverError::Config("at least one tileset is required".into()));
        }
        Ok(Self { tilesets })
    }

    /// Decode every tileset file in parallel.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load<P>(paths: &[P], sprite_size: u32, columns: Option<u32>) -> Result<Self>
    where
        P: AsRef<Path> + Sync,
    {
        use rayon::prelude::*;

        let tilesets = paths
            .par_iter()
            .map(|path| Tileset::load(path, sprite_size, columns))
            .collect::<Result<Vec<_>>>()?;
        Self::new(tilesets)
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tileset> {
        self.tilesets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tileset> {
        self.tilesets.iter()
    }
}

impl From<Tileset> for TileBank {
    fn from(tileset: Tileset) -> Self {
        Self { tilesets: vec![tileset] }
    }
}
