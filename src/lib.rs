//! Brightness-driven tile mosaics.
//!
//! A source image is cut into a grid of square cells. Each cell's mean luma
//! picks a brightness column in a sprite tileset, a row picks one of that
//! column's variations, and the sprite is drawn over the cell. Work happens
//! incrementally: a [`MosaicSession`] processes a bounded number of cells per
//! [`MosaicSession::advance`] call so a driver can spread a large mosaic over
//! many frames.

pub mod canvas;
pub mod config;
pub mod grid;
pub mod naming;
pub mod sample;
pub mod select;
pub mod session;
pub mod tileset;
pub mod walker;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use canvas::{ImageCanvas, Renderer, TileDraw};
pub use config::{MosaicConfig, Resample};
pub use grid::{Cell, EdgePolicy, GridSpec, Rect, TileSizing};
pub use select::{ColumnMapping, RowPolicy, TileSelection, TileSelector, TilesetPolicy};
pub use session::MosaicSession;
pub use tileset::{TileBank, Tileset};
pub use walker::{GridWalker, Phase, Progress, WalkerState};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeaverError {
    #[error("Failed to load {path}: {source}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Empty region at ({x}, {y}) sized {width}x{height}")]
    EmptyRegion { x: u32, y: u32, width: u32, height: u32 },
    #[error("Tileset has no sprites")]
    EmptyTileset,
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Cannot change the grid while a run is in progress")]
    RunInProgress,
    #[error("Config error: {0}")]
    Config(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WeaverError>;

/// Load the image a mosaic is built from.
pub fn load_source(path: impl AsRef<std::path::Path>) -> Result<image::RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| WeaverError::AssetLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}
