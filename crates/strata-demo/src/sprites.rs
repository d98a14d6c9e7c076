//! Procedurally generated sprite sheets for the demo level.

use anyhow::{Context, Result};
use strata_engine::render::SpriteBatcher;

pub const GROUND: &str = "tiles/ground.png";
pub const CLOUD: &str = "tiles/cloud.png";
pub const STONE: &str = "tiles/stone.png";
pub const HERO: [&str; 2] = ["hero/run0.png", "hero/run1.png"];
pub const RING: &str = "items/ring.png";
pub const CRATE: &str = "objects/crate.png";
pub const DRONE: &str = "script/drone.png";
pub const HILLS: &str = "themes/hills.png";
pub const GRASS: &str = "themes/grass.png";

/// Straight-alpha RGBA8 image.
struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, pixels }
    }
}

fn checker(a: [u8; 4], b: [u8; 4], cell: u32) -> impl Fn(u32, u32) -> [u8; 4] {
    move |x, y| if (x / cell + y / cell) % 2 == 0 { a } else { b }
}

/// Filled disc with a transparent outside; `hole` punches a ring.
fn disc(size: u32, color: [u8; 4], hole: f32) -> impl Fn(u32, u32) -> [u8; 4] {
    let r = size as f32 * 0.5;
    move |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        let d = (dx * dx + dy * dy).sqrt() / r;
        if d <= 1.0 && d >= hole { color } else { [0, 0, 0, 0] }
    }
}

fn hero(frame: u32) -> impl Fn(u32, u32) -> [u8; 4] {
    move |x, y| {
        let leg = if frame == 0 { x < 6 || x > 9 } else { x > 4 && x < 11 };
        match y {
            0..=5 if (4..12).contains(&x) => [250, 220, 180, 255],
            6..=15 if (3..13).contains(&x) => [40, 90, 220, 255],
            16..=23 if leg && (3..13).contains(&x) => [30, 30, 60, 255],
            _ => [0, 0, 0, 0],
        }
    }
}

fn hills(x: u32, y: u32) -> [u8; 4] {
    let crest = 40.0 + 14.0 * (x as f32 / 64.0 * std::f32::consts::TAU).sin();
    if (y as f32) > crest { [70, 140, 90, 255] } else { [0, 0, 0, 0] }
}

fn grass(x: u32, y: u32) -> [u8; 4] {
    let blade = 16 - (x * 7 % 11);
    if y >= blade { [30, 110, 40, 255] } else { [0, 0, 0, 0] }
}

fn sheet() -> Vec<(&'static str, Image)> {
    vec![
        (GROUND, Image::from_fn(16, 16, checker([150, 100, 60, 255], [130, 85, 50, 255], 4))),
        (CLOUD, Image::from_fn(16, 16, checker([240, 240, 255, 255], [220, 225, 245, 255], 8))),
        (STONE, Image::from_fn(16, 16, checker([120, 120, 130, 255], [100, 100, 110, 255], 2))),
        (HERO[0], Image::from_fn(16, 24, hero(0))),
        (HERO[1], Image::from_fn(16, 24, hero(1))),
        (RING, Image::from_fn(12, 12, disc(12, [250, 210, 40, 255], 0.55))),
        (CRATE, Image::from_fn(16, 16, checker([170, 120, 50, 255], [150, 100, 40, 255], 8))),
        (DRONE, Image::from_fn(16, 16, disc(16, [200, 60, 200, 255], 0.0))),
        (HILLS, Image::from_fn(64, 64, hills)),
        (GRASS, Image::from_fn(32, 16, grass)),
    ]
}

/// Uploads every demo image to the batcher.
pub fn register_all(batcher: &mut SpriteBatcher) -> Result<()> {
    for (path, image) in sheet() {
        batcher
            .register_image(path, image.width, image.height, &image.pixels)
            .with_context(|| format!("failed to register {path}"))?;
    }
    log::info!("registered {} demo images", batcher.image_count());
    Ok(())
}
