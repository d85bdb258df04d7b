//! Resumable row-major walk over a mosaic grid.

use crate::grid::{Cell, GridSpec};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkerState {
    pub row: u32,
    pub col: u32,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    Running,
    Complete,
}

/// Outcome of one [`GridWalker::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub cells_processed: usize,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GridWalker {
    state: WalkerState,
    phase: Phase,
}

impl GridWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WalkerState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.state.complete
    }

    /// Cells already visited, counted in row-major order.
    pub fn cells_done(&self, grid: &GridSpec) -> u64 {
        if self.state.complete {
            return grid.cell_count();
        }
        self.state.row as u64 * grid.total_cols as u64 + self.state.col as u64
    }

    /// Visit up to `quota` cells starting at the cursor.
    ///
    /// If `visit` fails the walker is restored to where this call began and
    /// the error is returned.
    pub fn advance<F>(&mut self, grid: &GridSpec, quota: usize, mut visit: F) -> Result<Progress>
    where
        F: FnMut(Cell) -> Result<()>,
    {
        if self.state.complete {
            return Ok(Progress { cells_processed: 0, is_complete: true });
        }
        if quota == 0 {
            return Ok(Progress { cells_processed: 0, is_complete: false });
        }

        let checkpoint = *self;
        self.phase = Phase::Running;

        let mut processed = 0;
        while processed < quota {
            if self.finish_if_exhausted(grid) {
                break;
            }

            let cell = grid.cell(self.state.row, self.state.col);
            if let Err(err) = visit(cell) {
                *self = checkpoint;
                return Err(err);
            }
            processed += 1;

            self.state.col += 1;
            if self.state.col >= grid.total_cols {
                self.state.col = 0;
                self.state.row += 1;
            }
        }
        self.finish_if_exhausted(grid);

        Ok(Progress { cells_processed: processed, is_complete: self.state.complete })
    }

    pub fn restart(&mut self) {
        *self = Self::default();
    }

    fn finish_if_exhausted(&mut self, grid: &GridSpec) -> bool {
        if self.state.row >= grid.total_rows {
            self.state.complete = true;
            self.phase = Phase::Complete;
        }
        self.state.complete
    }
}
