//! weaver CLI - build a tile mosaic from an image and sprite tilesets

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::SystemTime;
use weaver::{
    naming, MosaicConfig, MosaicSession, TileBank, TileSizing, TilesetPolicy, WeaverError,
};

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// A random tileset for every tile
    PerTile,
    /// One random tileset for the whole run
    PerRun,
    /// Always the base tileset
    Fixed,
    /// The base tileset, with random accents at --accent-chance
    Accent,
}

#[derive(Parser)]
#[command(name = "weaver", about = "Turn an image into a mosaic of brightness-matched tiles")]
struct Args {
    /// Source image (overrides the config file)
    input: Option<PathBuf>,
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Tileset sprite sheet; repeat for several
    #[arg(short, long)]
    tileset: Vec<PathBuf>,
    /// Number of tiles across the source width
    #[arg(short = 'n', long, conflicts_with = "tile_size")]
    tiles_per_row: Option<u32>,
    /// Tile side in source pixels
    #[arg(long)]
    tile_size: Option<u32>,
    /// Sprite side in the tileset, in pixels
    #[arg(long)]
    sprite_size: Option<u32>,
    /// Brightness columns per tileset
    #[arg(long)]
    columns: Option<u32>,
    /// Tiles processed per tick
    #[arg(long)]
    tiles_per_frame: Option<usize>,
    /// Canvas pixels per source pixel
    #[arg(long)]
    scale: Option<u32>,
    /// Seed for tile variation
    #[arg(long)]
    seed: Option<u64>,
    /// How tilesets are picked
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,
    /// Base tileset index for --policy fixed/accent
    #[arg(long, default_value = "0")]
    base: usize,
    /// Chance of an accent tile for --policy accent
    #[arg(long, default_value = "0.125")]
    accent_chance: f64,
    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output file name, without a stamp
    #[arg(long)]
    name: Option<String>,
    /// Append a YYMMDD-HHMMSS stamp to the file name
    #[arg(long)]
    stamp: bool,
}

impl Args {
    fn apply(&self, config: &mut MosaicConfig) {
        if let Some(input) = &self.input {
            config.source = Some(input.clone());
        }
        if !self.tileset.is_empty() {
            config.tilesets = self.tileset.clone();
        }
        if let Some(n) = self.tiles_per_row {
            config.sizing = TileSizing::TilesPerRow(n);
        }
        if let Some(px) = self.tile_size {
            config.sizing = TileSizing::TileSize(px);
        }
        if let Some(size) = self.sprite_size {
            config.sprite_size = size;
        }
        if self.columns.is_some() {
            config.columns = self.columns;
        }
        if let Some(n) = self.tiles_per_frame {
            config.tiles_per_frame = n;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(policy) = self.policy {
            config.tileset_policy = match policy {
                Policy::PerTile => TilesetPolicy::RandomPerTile,
                Policy::PerRun => TilesetPolicy::RandomPerRun,
                Policy::Fixed => TilesetPolicy::Fixed(self.base),
                Policy::Accent => TilesetPolicy::Accent { base: self.base, chance: self.accent_chance },
            };
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        if let Some(name) = &self.name {
            config.output_prefix = name.clone();
        }
        config.stamp |= self.stamp;
    }
}

fn main() -> Result<(), WeaverError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MosaicConfig::load(path)?,
        None => MosaicConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let source_path = config
        .source
        .clone()
        .ok_or_else(|| WeaverError::Config("no source image given".into()))?;
    if config.tilesets.is_empty() {
        config.tilesets.push(PathBuf::from("tiles/tileset.png"));
    }

    let source = weaver::load_source(&source_path)?;
    let bank = TileBank::load(&config.tilesets, config.sprite_size, config.columns)?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut session = MosaicSession::with_image_canvas(source, bank, &config, rng)?;
    let grid = *session.grid();
    println!(
        "Grid: {}x{} tiles @ {}px from {}",
        grid.total_cols,
        grid.total_rows,
        grid.tile_size,
        source_path.display()
    );

    let bar = ProgressBar::new(grid.cell_count());
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    session.begin();
    while session.is_active() {
        let progress = session.tick()?;
        bar.inc(progress.cells_processed as u64);
    }
    bar.finish();

    let name = naming::output_name(&config.output_prefix, config.stamp, SystemTime::now());
    let path = session.save(&config.output_dir, &name)?;
    println!("Saved: {}", path.display());
    Ok(())
}
