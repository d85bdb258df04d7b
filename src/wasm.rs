//! WebAssembly bindings for weaver
//!
//! The page owns the canvas: each `advance` call returns the sprite blits to
//! perform with `drawImage`, nine numbers per tile.

use crate::canvas::{Renderer, TileDraw};
use crate::config::MosaicConfig;
use crate::session::MosaicSession;
use crate::tileset::{TileBank, Tileset};
use crate::WeaverError;
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

/// Values emitted per draw: dest x, y, w, h, tileset, src x, y, w, h.
const DRAW_STRIDE: usize = 9;

fn js_error(err: WeaverError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn rgba(data: &[u8], width: u32, height: u32) -> Result<RgbaImage, JsValue> {
    RgbaImage::from_raw(width, height, data.to_vec())
        .ok_or_else(|| JsValue::from_str("Invalid image dimensions"))
}

#[derive(Default)]
struct DrawList {
    pending: Vec<u32>,
}

impl Renderer for DrawList {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn draw(&mut self, draw: &TileDraw, _bank: &TileBank) -> crate::Result<()> {
        let (dest, src) = (draw.dest, draw.selection.source);
        self.pending.extend_from_slice(&[
            dest.x,
            dest.y,
            dest.width,
            dest.height,
            draw.selection.tileset as u32,
            src.x,
            src.y,
            src.width,
            src.height,
        ]);
        Ok(())
    }
}

/// Tilesets collected before a mosaic is created.
#[wasm_bindgen]
#[derive(Default)]
pub struct WasmTileBank {
    tilesets: Vec<Tileset>,
}

#[wasm_bindgen]
impl WasmTileBank {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmTileBank {
        WasmTileBank::default()
    }

    /// Add an RGBA sprite sheet. `columns == 0` uses every sprite across.
    #[wasm_bindgen]
    pub fn add(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        sprite_size: u32,
        columns: u32,
    ) -> Result<(), JsValue> {
        let columns = (columns > 0).then_some(columns);
        let tileset = Tileset::from_image(rgba(data, width, height)?, sprite_size, columns)
            .map_err(js_error)?;
        self.tilesets.push(tileset);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn len(&self) -> usize {
        self.tilesets.len()
    }
}

#[wasm_bindgen]
pub struct WasmMosaic {
    session: MosaicSession<StdRng, DrawList>,
}

#[wasm_bindgen]
impl WasmMosaic {
    /// Create a mosaic over RGBA `source` pixels.
    ///
    /// # Arguments
    /// * `bank` - Tilesets to draw from, in index order
    /// * `config_json` - `MosaicConfig` as JSON; empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(
        source: &[u8],
        width: u32,
        height: u32,
        bank: &WasmTileBank,
        config_json: &str,
    ) -> Result<WasmMosaic, JsValue> {
        let config: MosaicConfig = if config_json.trim().is_empty() {
            MosaicConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(|e| js_error(e.into()))?
        };
        let seed = config
            .seed
            .unwrap_or_else(|| (js_sys::Math::random() * u64::MAX as f64) as u64);

        let bank = TileBank::new(bank.tilesets.clone()).map_err(js_error)?;
        let session = MosaicSession::new(
            rgba(source, width, height)?,
            bank,
            &config,
            StdRng::seed_from_u64(seed),
            DrawList::default(),
        )
        .map_err(js_error)?;
        Ok(WasmMosaic { session })
    }

    /// Process up to `quota` tiles and return their blits.
    #[wasm_bindgen]
    pub fn advance(&mut self, quota: usize) -> Result<js_sys::Uint32Array, JsValue> {
        let was_complete = self.session.is_complete();
        let result = self.session.advance(quota);
        let draws = std::mem::take(&mut self.session.canvas_mut().pending);
        result.map_err(js_error)?;

        if self.session.is_complete() && !was_complete {
            web_sys::console::log_1(&"Mosaic complete".into());
        }
        Ok(js_sys::Uint32Array::from(&draws[..]))
    }

    /// `advance` with the configured tiles per frame.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> Result<js_sys::Uint32Array, JsValue> {
        self.advance(self.session.tiles_per_frame())
    }

    /// Reset progress; the page should clear its canvas too.
    #[wasm_bindgen]
    pub fn restart(&mut self) {
        self.session.restart();
    }

    #[wasm_bindgen]
    pub fn set_tiles_per_row(&mut self, tiles_per_row: u32) -> Result<(), JsValue> {
        self.session
            .set_tile_sizing(crate::grid::TileSizing::TilesPerRow(tiles_per_row))
            .map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// Fraction of cells drawn, 0.0 to 1.0.
    #[wasm_bindgen]
    pub fn progress(&self) -> f64 {
        self.session.cells_done() as f64 / self.session.grid().cell_count() as f64
    }

    #[wasm_bindgen]
    pub fn columns(&self) -> u32 {
        self.session.grid().total_cols
    }

    #[wasm_bindgen]
    pub fn rows(&self) -> u32 {
        self.session.grid().total_rows
    }

    #[wasm_bindgen]
    pub fn tile_size(&self) -> u32 {
        self.session.grid().tile_size
    }

    #[wasm_bindgen]
    pub fn draw_stride() -> usize {
        DRAW_STRIDE
    }
}
