//! Mosaic session - owns the walk state and drives sampling, selection and
//! drawing one bounded batch of cells at a time.

use crate::canvas::{ImageCanvas, Renderer, TileDraw};
use crate::config::MosaicConfig;
use crate::grid::{EdgePolicy, GridSpec, Rect, TileSizing};
use crate::naming;
use crate::sample::sample_region;
use crate::select::TileSelector;
use crate::tileset::TileBank;
use crate::walker::{GridWalker, Phase, Progress, WalkerState};
use crate::{Result, WeaverError};
use image::{Rgba, RgbaImage};
use rand::Rng;
use std::path::{Path, PathBuf};

/// A single mosaic run over one source image.
///
/// The driver owns the session and calls [`tick`](Self::tick) or
/// [`advance`](Self::advance) once per frame. Nothing here blocks or
/// touches the filesystem except [`save`](MosaicSession::save).
pub struct MosaicSession<R: Rng, C: Renderer> {
    source: RgbaImage,
    bank: TileBank,
    edge: EdgePolicy,
    scale: u32,
    grid: GridSpec,
    walker: GridWalker,
    selector: TileSelector<R>,
    canvas: C,
    tiles_per_frame: usize,
    active: bool,
}

impl<R: Rng, C: Renderer> MosaicSession<R, C> {
    pub fn new(
        source: RgbaImage,
        bank: TileBank,
        config: &MosaicConfig,
        rng: R,
        mut canvas: C,
    ) -> Result<Self> {
        config.validate()?;
        config.tileset_policy.validate(bank.len())?;

        let grid = GridSpec::new(source.width(), source.height(), config.sizing, config.edge)?;
        if grid.has_partial_edges() {
            log::warn!(
                "{}x{} source doesn't divide into {}px tiles; edge cells are partial",
                source.width(),
                source.height(),
                grid.tile_size
            );
        }
        let (width, height) = grid.canvas_size(config.edge, config.scale)?;
        canvas.resize(width, height);

        let selector = TileSelector::new(
            rng,
            config.tileset_policy,
            config.row_policy,
            config.column_mapping,
        );

        Ok(Self {
            source,
            bank,
            edge: config.edge,
            scale: config.scale,
            grid,
            walker: GridWalker::new(),
            selector,
            canvas,
            tiles_per_frame: config.tiles_per_frame,
            active: false,
        })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn bank(&self) -> &TileBank {
        &self.bank
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    pub fn state(&self) -> WalkerState {
        self.walker.state()
    }

    pub fn phase(&self) -> Phase {
        self.walker.phase()
    }

    pub fn is_complete(&self) -> bool {
        self.walker.is_complete()
    }

    /// Whether [`tick`](Self::tick) will do work.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tiles_per_frame(&self) -> usize {
        self.tiles_per_frame
    }

    pub fn cells_done(&self) -> u64 {
        self.walker.cells_done(&self.grid)
    }

    /// Start or resume ticking. Returns false once the run is complete.
    pub fn begin(&mut self) -> bool {
        if self.walker.is_complete() {
            log::info!("Mosaic already complete; restart to run again");
            return false;
        }
        self.active = true;
        true
    }

    /// Stop ticking without losing progress.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Process one frame's worth of cells if the session is active.
    pub fn tick(&mut self) -> Result<Progress> {
        if !self.active {
            return Ok(Progress { cells_processed: 0, is_complete: self.walker.is_complete() });
        }
        self.advance(self.tiles_per_frame)
    }

    /// Sample, select and draw up to `quota` cells.
    pub fn advance(&mut self, quota: usize) -> Result<Progress> {
        let was = self.walker.phase();
        if was == Phase::NotStarted && quota > 0 {
            self.selector.start_run(&self.bank);
            log::info!(
                "Starting {}x{} mosaic: {} cells of {}px",
                self.grid.total_cols,
                self.grid.total_rows,
                self.grid.cell_count(),
                self.grid.tile_size
            );
        }

        let Self { source, bank, scale, grid, walker, selector, canvas, .. } = self;
        let (grid, scale): (&GridSpec, u32) = (grid, *scale);
        let progress = walker.advance(grid, quota, |cell| {
            let luminance = sample_region(source, grid.sample_rect(&cell))?;
            let selection = selector.select(luminance, bank)?;
            let dest = Rect::new(cell.x * scale, cell.y * scale, cell.size * scale, cell.size * scale);
            canvas.draw(&TileDraw { cell, dest, selection }, bank)
        })?;

        log::debug!(
            "Processed {} cells, {}/{} done",
            progress.cells_processed,
            self.cells_done(),
            self.grid.cell_count()
        );
        if progress.is_complete && was != Phase::Complete {
            self.active = false;
            log::info!("Mosaic complete");
        }
        Ok(progress)
    }

    /// Discard all progress and clear the canvas.
    pub fn restart(&mut self) {
        if self.walker.phase() == Phase::Running {
            log::info!("Restarting mosaic at {}/{} cells", self.cells_done(), self.grid.cell_count());
        }
        self.walker.restart();
        self.canvas.clear();
    }

    /// Change the cell size. Rejected while a run is in progress; a finished
    /// run is restarted on the new grid.
    pub fn set_tile_sizing(&mut self, sizing: TileSizing) -> Result<()> {
        if self.walker.phase() == Phase::Running {
            return Err(WeaverError::RunInProgress);
        }
        let grid = GridSpec::new(self.source.width(), self.source.height(), sizing, self.edge)?;
        let (width, height) = grid.canvas_size(self.edge, self.scale)?;
        self.grid = grid;
        self.canvas.resize(width, height);
        self.restart();
        Ok(())
    }
}

impl<R: Rng> MosaicSession<R, ImageCanvas> {
    /// Session drawing into an in-memory image sized for the grid.
    pub fn with_image_canvas(
        source: RgbaImage,
        bank: TileBank,
        config: &MosaicConfig,
        rng: R,
    ) -> Result<Self> {
        let canvas = ImageCanvas::new(1, 1, Rgba(config.background), config.filter());
        Self::new(source, bank, config, rng, canvas)
    }

    /// Write the canvas to `dir/name` (`.png` if `name` has no extension).
    pub fn save(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = naming::output_path(dir, name);
        self.canvas.persist(&path)?;
        Ok(path)
    }
}
