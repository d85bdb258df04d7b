//! Tile selection - maps a luma value to a sprite in the tile bank.

use crate::grid::Rect;
use crate::tileset::{TileBank, Tileset};
use crate::{Result, WeaverError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How mean luma in `[0, 255]` becomes a brightness column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMapping {
    /// `floor(l / 255 * (columns - epsilon))`. The epsilon keeps full white
    /// on the last column instead of one past it.
    Epsilon(f32),
    /// `min(floor(l / 255 * columns), columns - 1)`.
    Clamped,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping::Epsilon(0.01)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Uniform random variation row per cell.
    #[default]
    Random,
    /// Always the top row.
    First,
}

/// Which tileset of the bank a cell draws from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TilesetPolicy {
    Fixed(usize),
    RandomPerTile,
    /// One random tileset chosen when a run starts.
    RandomPerRun,
    /// A random tileset with probability `chance`, otherwise `base`.
    Accent { base: usize, chance: f64 },
}

impl Default for TilesetPolicy {
    fn default() -> Self {
        TilesetPolicy::RandomPerTile
    }
}

impl TilesetPolicy {
    pub fn validate(&self, bank_len: usize) -> Result<()> {
        match *self {
            TilesetPolicy::Fixed(i) | TilesetPolicy::Accent { base: i, .. } if i >= bank_len => {
                Err(WeaverError::Config(format!(
                    "tileset index {i} out of range for {bank_len} tilesets"
                )))
            }
            TilesetPolicy::Accent { chance, .. } if !(0.0..=1.0).contains(&chance) => Err(
                WeaverError::Config(format!("accent chance {chance} is outside [0, 1]")),
            ),
            _ => Ok(()),
        }
    }
}

/// Sprite picked for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSelection {
    pub tileset: usize,
    pub column: u32,
    pub row: u32,
    pub source: Rect,
}

/// Brightness column for `luminance`. Fails with `EmptyTileset` when there
/// are no columns.
pub fn column_index(luminance: f32, columns: u32, mapping: ColumnMapping) -> Result<u32> {
    if columns == 0 {
        return Err(WeaverError::EmptyTileset);
    }
    let l = if luminance.is_nan() { 0.0 } else { luminance.clamp(0.0, 255.0) };
    let index = match mapping {
        ColumnMapping::Epsilon(epsilon) => (l / 255.0 * (columns as f32 - epsilon)).floor() as u32,
        ColumnMapping::Clamped => (l / 255.0 * columns as f32).floor() as u32,
    };
    // an epsilon outside (0, 1) would otherwise reach `columns` at full white
    Ok(index.min(columns - 1))
}

/// Pick a sprite from a single tileset.
pub fn select_sprite<R: Rng>(
    luminance: f32,
    tileset: &Tileset,
    tileset_index: usize,
    rows: RowPolicy,
    mapping: ColumnMapping,
    rng: &mut R,
) -> Result<TileSelection> {
    let column = column_index(luminance, tileset.columns(), mapping)?;
    let row = match rows {
        RowPolicy::Random if tileset.rows() > 1 => rng.random_range(0..tileset.rows()),
        _ => 0,
    };
    Ok(TileSelection {
        tileset: tileset_index,
        column,
        row,
        source: tileset.sprite_rect(column, row),
    })
}

/// Stateful selector holding the injected RNG and variation policies.
#[derive(Debug, Clone)]
pub struct TileSelector<R: Rng> {
    rng: R,
    tilesets: TilesetPolicy,
    rows: RowPolicy,
    mapping: ColumnMapping,
    run_tileset: usize,
}

impl<R: Rng> TileSelector<R> {
    pub fn new(rng: R, tilesets: TilesetPolicy, rows: RowPolicy, mapping: ColumnMapping) -> Self {
        let run_tileset = match tilesets {
            TilesetPolicy::Fixed(i) | TilesetPolicy::Accent { base: i, .. } => i,
            _ => 0,
        };
        Self { rng, tilesets, rows, mapping, run_tileset }
    }

    /// Called when a run starts; rolls the per-run tileset if the policy has one.
    pub fn start_run(&mut self, bank: &TileBank) {
        if let TilesetPolicy::RandomPerRun = self.tilesets {
            self.run_tileset = self.rng.random_range(0..bank.len());
            log::debug!("Using tileset {} for this run", self.run_tileset);
        }
    }

    pub fn select(&mut self, luminance: f32, bank: &TileBank) -> Result<TileSelection> {
        let index = self.pick_tileset(bank.len());
        let tileset = bank.get(index).ok_or_else(|| {
            WeaverError::Config(format!("tileset index {index} out of range"))
        })?;
        select_sprite(luminance, tileset, index, self.rows, self.mapping, &mut self.rng)
    }

    fn pick_tileset(&mut self, bank_len: usize) -> usize {
        match self.tilesets {
            TilesetPolicy::Fixed(i) => i,
            TilesetPolicy::RandomPerRun => self.run_tileset,
            TilesetPolicy::RandomPerTile => self.rng.random_range(0..bank_len),
            TilesetPolicy::Accent { base, chance } => {
                if self.rng.random_bool(chance) {
                    self.rng.random_range(0..bank_len)
                } else {
                    base
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn tileset(columns: u32, rows: u32) -> Tileset {
        Tileset::from_image(RgbaImage::new(columns * 50, rows * 50), 50, None).unwrap()
    }

    fn bank(n: usize) -> TileBank {
        TileBank::new((0..n).map(|_| tileset(8, 4)).collect()).unwrap()
    }

    #[test]
    fn test_epsilon_guard_bounds() {
        let mapping = ColumnMapping::default();
        assert_eq!(column_index(0.0, 8, mapping).unwrap(), 0);
        assert_eq!(column_index(255.0, 8, mapping).unwrap(), 7);
        assert_eq!(column_index(127.5, 8, mapping).unwrap(), 3);
        assert_eq!(column_index(300.0, 8, mapping).unwrap(), 7);
        assert_eq!(column_index(-4.0, 8, mapping).unwrap(), 0);
        assert_eq!(column_index(f32::NAN, 8, mapping).unwrap(), 0);
    }

    #[test]
    fn test_clamped_mapping() {
        assert_eq!(column_index(0.0, 8, ColumnMapping::Clamped).unwrap(), 0);
        assert_eq!(column_index(255.0, 8, ColumnMapping::Clamped).unwrap(), 7);
        assert_eq!(column_index(128.0, 8, ColumnMapping::Clamped).unwrap(), 4);
    }

    #[test]
    fn test_columns_monotonic_and_in_range() {
        for columns in [1, 2, 8, 13] {
            let mut last = 0;
            for step in 0..=255 {
                let c = column_index(step as f32, columns, ColumnMapping::default()).unwrap();
                assert!(c < columns);
                assert!(c >= last);
                last = c;
            }
            assert_eq!(last, columns - 1);
        }
    }

    #[test]
    fn test_degenerate_epsilon_stays_on_sheet() {
        for epsilon in [0.0, -0.5, -3.0] {
            let mapping = ColumnMapping::Epsilon(epsilon);
            assert_eq!(column_index(255.0, 8, mapping).unwrap(), 7);
            assert_eq!(column_index(0.0, 8, mapping).unwrap(), 0);
        }

        let sheet = tileset(8, 1);
        let mut rng = StdRng::seed_from_u64(2);
        let selection =
            select_sprite(255.0, &sheet, 0, RowPolicy::First, ColumnMapping::Epsilon(0.0), &mut rng)
                .unwrap();
        assert_eq!(selection.source, Rect::new(350, 0, 50, 50));
    }

    #[test]
    fn test_zero_columns() {
        assert!(matches!(
            column_index(10.0, 0, ColumnMapping::default()),
            Err(WeaverError::EmptyTileset)
        ));
    }

    #[test]
    fn test_source_offsets() {
        let sheet = tileset(8, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let selection =
            select_sprite(255.0, &sheet, 0, RowPolicy::Random, ColumnMapping::default(), &mut rng)
                .unwrap();
        assert_eq!(selection.column, 7);
        assert_eq!(selection.row, 0);
        assert_eq!(selection.source, Rect::new(350, 0, 50, 50));
    }

    #[test]
    fn test_random_rows_cover_sheet() {
        let sheet = tileset(8, 4);
        let mut rng = StdRng::seed_from_u64(7);
        let rows: HashSet<u32> = (0..200)
            .map(|_| {
                select_sprite(90.0, &sheet, 0, RowPolicy::Random, ColumnMapping::default(), &mut rng)
                    .unwrap()
                    .row
            })
            .collect();
        assert_eq!(rows, (0..4).collect());

        let first = select_sprite(90.0, &sheet, 0, RowPolicy::First, ColumnMapping::default(), &mut rng)
            .unwrap();
        assert_eq!(first.source.y, 0);
    }

    #[test]
    fn test_seeded_selector_deterministic() {
        let bank = bank(4);
        let picks = |seed| {
            let mut selector = TileSelector::new(
                StdRng::seed_from_u64(seed),
                TilesetPolicy::RandomPerTile,
                RowPolicy::Random,
                ColumnMapping::default(),
            );
            (0..50).map(|i| selector.select(i as f32 * 5.0, &bank).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn test_fixed_policy() {
        let bank = bank(3);
        let mut selector = TileSelector::new(
            StdRng::seed_from_u64(3),
            TilesetPolicy::Fixed(2),
            RowPolicy::Random,
            ColumnMapping::default(),
        );
        assert!((0..30).all(|_| selector.select(40.0, &bank).unwrap().tileset == 2));
    }

    #[test]
    fn test_random_per_run_policy() {
        let bank = bank(8);
        let mut selector = TileSelector::new(
            StdRng::seed_from_u64(11),
            TilesetPolicy::RandomPerRun,
            RowPolicy::Random,
            ColumnMapping::default(),
        );
        let mut chosen = HashSet::new();
        for _ in 0..20 {
            selector.start_run(&bank);
            let first = selector.select(10.0, &bank).unwrap().tileset;
            assert!((0..20).all(|_| selector.select(200.0, &bank).unwrap().tileset == first));
            chosen.insert(first);
        }
        assert!(chosen.len() > 1);
    }

    #[test]
    fn test_accent_policy_extremes() {
        let bank = bank(8);
        let mut never = TileSelector::new(
            StdRng::seed_from_u64(5),
            TilesetPolicy::Accent { base: 1, chance: 0.0 },
            RowPolicy::First,
            ColumnMapping::default(),
        );
        assert!((0..100).all(|_| never.select(50.0, &bank).unwrap().tileset == 1));

        let mut always = TileSelector::new(
            StdRng::seed_from_u64(5),
            TilesetPolicy::Accent { base: 1, chance: 1.0 },
            RowPolicy::First,
            ColumnMapping::default(),
        );
        let seen: HashSet<usize> = (0..200).map(|_| always.select(50.0, &bank).unwrap().tileset).collect();
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_policy_validation() {
        assert!(TilesetPolicy::Fixed(2).validate(3).is_ok());
        assert!(TilesetPolicy::Fixed(3).validate(3).is_err());
        assert!(TilesetPolicy::Accent { base: 0, chance: 1.5 }.validate(3).is_err());
        assert!(TilesetPolicy::Accent { base: 4, chance: 0.5 }.validate(3).is_err());
        assert!(TilesetPolicy::RandomPerTile.validate(1).is_ok());
    }
}
