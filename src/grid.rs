//! Grid geometry - splits a source image into square mosaic cells.

use crate::{Result, WeaverError};
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Intersect with `(0, 0, width, height)`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Rect {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// How the cell size is derived from the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSizing {
    /// Number of cells across the source width.
    TilesPerRow(u32),
    /// Explicit cell side in source pixels.
    TileSize(u32),
}

impl Default for TileSizing {
    fn default() -> Self {
        TileSizing::TilesPerRow(50)
    }
}

/// What to do with cells that only partly overlap the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Keep partial cells; their samples are clamped to the image.
    #[default]
    Include,
    /// Only whole cells are part of the grid.
    Drop,
}

/// One grid cell in source-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

impl Cell {
    /// Full square covered by the cell, which may run past the image edge.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub tile_size: u32,
    pub total_cols: u32,
    pub total_rows: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl GridSpec {
    pub fn new(width: u32, height: u32, sizing: TileSizing, edge: EdgePolicy) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(WeaverError::InvalidGrid(format!(
                "source image is {width}x{height}"
            )));
        }

        let tile_size = match sizing {
            TileSizing::TilesPerRow(0) => {
                return Err(WeaverError::InvalidGrid("tiles per row must be positive".into()))
            }
            TileSizing::TilesPerRow(n) => width / n,
            TileSizing::TileSize(px) => px,
        };
        if tile_size == 0 {
            return Err(WeaverError::InvalidGrid(format!(
                "{sizing:?} gives a zero tile size for a {width}px wide image"
            )));
        }

        let (total_cols, total_rows) = match edge {
            EdgePolicy::Include => (width.div_ceil(tile_size), height.div_ceil(tile_size)),
            EdgePolicy::Drop => (width / tile_size, height / tile_size),
        };
        if total_cols == 0 || total_rows == 0 {
            return Err(WeaverError::InvalidGrid(format!(
                "{tile_size}px tiles leave no whole cell in a {width}x{height} image"
            )));
        }

        Ok(Self { tile_size, total_cols, total_rows, source_width: width, source_height: height })
    }

    pub fn cell_count(&self) -> u64 {
        self.total_cols as u64 * self.total_rows as u64
    }

    pub fn cell(&self, row: u32, col: u32) -> Cell {
        Cell {
            row,
            col,
            x: col * self.tile_size,
            y: row * self.tile_size,
            size: self.tile_size,
        }
    }

    /// Part of the cell's square that lies inside the source image.
    pub fn sample_rect(&self, cell: &Cell) -> Rect {
        cell.rect().clamp_to(self.source_width, self.source_height)
    }

    /// Whether the grid leaves partial cells at the right or bottom edge.
    pub fn has_partial_edges(&self) -> bool {
        self.total_cols as u64 * self.tile_size as u64 > self.source_width as u64
            || self.total_rows as u64 * self.tile_size as u64 > self.source_height as u64
    }

    /// Output canvas size when each source pixel becomes `scale` canvas pixels.
    ///
    /// Fails with `InvalidGrid` when the scaled cells, including any partial
    /// edge cell drawn full-size, don't fit in `u32` canvas coordinates.
    pub fn canvas_size(&self, edge: EdgePolicy, scale: u32) -> Result<(u32, u32)> {
        let extent = |cells: u32| {
            cells
                .checked_mul(self.tile_size)
                .and_then(|px| px.checked_mul(scale))
                .ok_or_else(|| {
                    WeaverError::InvalidGrid(format!(
                        "{cells} cells of {}px at scale {scale} overflow the canvas",
                        self.tile_size
                    ))
                })
        };
        let (width, height) = (extent(self.total_cols)?, extent(self.total_rows)?);
        Ok(match edge {
            // covered by the cell extent, which is never smaller than the source
            EdgePolicy::Include => (self.source_width * scale, self.source_height * scale),
            EdgePolicy::Drop => (width, height),
        })
    }
}
