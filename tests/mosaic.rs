use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use weaver::sample::sample_region;
use weaver::select::column_index;
use weaver::{
    MosaicConfig, MosaicSession, Renderer, Result, TileBank, TileDraw, TileSizing, Tileset,
    TilesetPolicy,
};

#[derive(Default)]
struct Recorder {
    draws: Vec<TileDraw>,
}

impl Renderer for Recorder {
    fn clear(&mut self) {
        self.draws.clear();
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn draw(&mut self, draw: &TileDraw, _bank: &TileBank) -> Result<()> {
        self.draws.push(*draw);
        Ok(())
    }
}

fn noisy_source() -> RgbaImage {
    RgbaImage::from_fn(100, 100, |x, y| {
        let v = ((x * 7 + y * 13) ^ (x * y)) as u8;
        Rgba([v, v.wrapping_mul(3), 255 - v, 255])
    })
}

fn tileset_bank(count: usize) -> TileBank {
    let sheets = (0..count)
        .map(|_| Tileset::from_image(RgbaImage::new(400, 150), 50, Some(8)).unwrap())
        .collect();
    TileBank::new(sheets).unwrap()
}

#[test]
fn test_full_mosaic_draws_each_cell_once() {
    let source = noisy_source();
    let config = MosaicConfig {
        sizing: TileSizing::TilesPerRow(10),
        tiles_per_frame: 20,
        ..Default::default()
    };
    let mut session = MosaicSession::new(
        source.clone(),
        tileset_bank(1),
        &config,
        StdRng::seed_from_u64(2024),
        Recorder::default(),
    )
    .unwrap();
    assert_eq!(session.grid().tile_size, 10);

    session.begin();
    let mut ticks = 0;
    while !session.is_complete() {
        session.tick().unwrap();
        ticks += 1;
    }
    assert_eq!(ticks, 5);

    let draws = &session.canvas().draws;
    assert_eq!(draws.len(), 100);
    let cells: HashSet<(u32, u32)> = draws.iter().map(|d| (d.cell.row, d.cell.col)).collect();
    assert_eq!(cells.len(), 100);

    for (i, draw) in draws.iter().enumerate() {
        assert_eq!((draw.cell.row, draw.cell.col), ((i / 10) as u32, (i % 10) as u32));
        assert_eq!((draw.dest.x, draw.dest.y), (draw.cell.col * 10, draw.cell.row * 10));
        assert_eq!((draw.dest.width, draw.dest.height), (10, 10));

        let luminance = sample_region(&source, draw.cell.rect()).unwrap();
        let column = column_index(luminance, 8, config.column_mapping).unwrap();
        assert_eq!(draw.selection.column, column);
        assert!(draw.selection.column < 8);
        assert!(draw.selection.row < 3);
        assert_eq!(draw.selection.source.x, column * 50);
        assert_eq!(draw.selection.source.width, 50);
    }
}

#[test]
fn test_completion_is_idempotent() {
    let config = MosaicConfig { sizing: TileSizing::TilesPerRow(10), ..Default::default() };
    let mut session = MosaicSession::new(
        noisy_source(),
        tileset_bank(8),
        &config,
        StdRng::seed_from_u64(5),
        Recorder::default(),
    )
    .unwrap();

    let progress = session.advance(1_000).unwrap();
    assert_eq!(progress.cells_processed, 100);
    assert!(progress.is_complete);
    let state = session.state();

    for _ in 0..3 {
        let progress = session.advance(10).unwrap();
        assert_eq!(progress.cells_processed, 0);
        assert!(progress.is_complete);
        assert_eq!(session.state(), state);
    }
    assert_eq!(session.canvas().draws.len(), 100);
}

#[test]
fn test_pause_and_resume_keeps_order() {
    let config = MosaicConfig {
        sizing: TileSizing::TilesPerRow(10),
        tiles_per_frame: 30,
        tileset_policy: TilesetPolicy::Accent { base: 2, chance: 0.125 },
        ..Default::default()
    };
    let mut session = MosaicSession::new(
        noisy_source(),
        tileset_bank(8),
        &config,
        StdRng::seed_from_u64(9),
        Recorder::default(),
    )
    .unwrap();

    session.begin();
    session.tick().unwrap();
    session.pause();
    for _ in 0..10 {
        session.tick().unwrap();
    }
    assert_eq!(session.cells_done(), 30);

    session.begin();
    while session.is_active() {
        session.tick().unwrap();
    }
    let order: Vec<(u32, u32)> =
        session.canvas().draws.iter().map(|d| (d.cell.row, d.cell.col)).collect();
    let expected: Vec<(u32, u32)> = (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).collect();
    assert_eq!(order, expected);

    let base = session.canvas().draws.iter().filter(|d| d.selection.tileset == 2).count();
    assert!(base > 50);
}

#[test]
fn test_image_canvas_end_to_end() {
    // 8 solid columns from black to white, one row
    let sheet = RgbaImage::from_fn(400, 50, |x, _| {
        let v = (x / 50 * 255 / 7) as u8;
        Rgba([v, v, v, 255])
    });
    let bank = TileBank::from(Tileset::from_image(sheet, 50, None).unwrap());
    let source = RgbaImage::from_fn(100, 100, |x, _| {
        let v = if x < 50 { 0 } else { 255 };
        Rgba([v, v, v, 255])
    });
    let config = MosaicConfig {
        sizing: TileSizing::TilesPerRow(10),
        resample: weaver::Resample::Nearest,
        ..Default::default()
    };

    let mut session =
        MosaicSession::with_image_canvas(source, bank, &config, StdRng::seed_from_u64(1)).unwrap();
    session.advance(usize::MAX).unwrap();
    let out = session.into_canvas().into_image();

    assert_eq!(out.dimensions(), (100, 100));
    assert_eq!(out.get_pixel(5, 5), &Rgba([0, 0, 0, 255]));
    assert_eq!(out.get_pixel(95, 95), &Rgba([255, 255, 255, 255]));
}
