//! Mosaic configuration, loadable from JSON.

use crate::grid::{EdgePolicy, TileSizing};
use crate::select::{ColumnMapping, RowPolicy, TilesetPolicy};
use crate::{Result, WeaverError};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filter used when sprites are scaled to the cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    Nearest,
    Triangle,
    CatmullRom,
    #[default]
    Lanczos3,
}

impl From<Resample> for FilterType {
    fn from(resample: Resample) -> Self {
        match resample {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Source image, if not given on the command line.
    pub source: Option<PathBuf>,
    /// Tileset sheets, in bank order.
    pub tilesets: Vec<PathBuf>,
    pub sizing: TileSizing,
    pub edge: EdgePolicy,
    /// Side of one sprite in the tileset, in pixels.
    pub sprite_size: u32,
    /// Brightness columns per tileset; defaults to every sprite across.
    pub columns: Option<u32>,
    /// Cells processed per tick.
    pub tiles_per_frame: usize,
    /// Canvas pixels per source pixel.
    pub scale: u32,
    pub seed: Option<u64>,
    pub tileset_policy: TilesetPolicy,
    pub row_policy: RowPolicy,
    pub column_mapping: ColumnMapping,
    pub background: [u8; 4],
    pub resample: Resample,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    /// Append a `YYMMDD-HHMMSS` stamp to saved file names.
    pub stamp: bool,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            source: None,
            tilesets: Vec::new(),
            sizing: TileSizing::default(),
            edge: EdgePolicy::default(),
            sprite_size: 50,
            columns: None,
            tiles_per_frame: 20,
            scale: 1,
            seed: None,
            tileset_policy: TilesetPolicy::default(),
            row_policy: RowPolicy::default(),
            column_mapping: ColumnMapping::default(),
            background: [255, 255, 255, 255],
            resample: Resample::default(),
            output_dir: PathBuf::from("."),
            output_prefix: "mosaic".to_string(),
            stamp: false,
        }
    }
}

impl MosaicConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sprite_size == 0 {
            return Err(WeaverError::Config("sprite_size must be positive".into()));
        }
        if self.tiles_per_frame == 0 {
            return Err(WeaverError::Config("tiles_per_frame must be positive".into()));
        }
        if self.scale == 0 {
            return Err(WeaverError::Config("scale must be positive".into()));
        }
        if self.columns == Some(0) {
            return Err(WeaverError::EmptyTileset);
        }
        match self.sizing {
            TileSizing::TilesPerRow(0) | TileSizing::TileSize(0) => {
                return Err(WeaverError::Config(format!("{:?} must be positive", self.sizing)))
            }
            _ => {}
        }
        if let ColumnMapping::Epsilon(eps) = self.column_mapping {
            if !(eps > 0.0 && eps < 1.0) {
                return Err(WeaverError::Config(format!("epsilon {eps} is outside (0, 1)")));
            }
        }
        if let TilesetPolicy::Accent { chance, .. } = self.tileset_policy {
            if !(0.0..=1.0).contains(&chance) {
                return Err(WeaverError::Config(format!("accent chance {chance} is outside [0, 1]")));
            }
        }
        if self.output_prefix.is_empty() {
            return Err(WeaverError::Config("output_prefix is empty".into()));
        }
        Ok(())
    }

    pub fn filter(&self) -> FilterType {
        self.resample.into()
    }
}
