//! A small hand-built level that exercises every renderable kind.

use strata_engine::coords::{Rect, Vec2, Viewport};
use strata_engine::paint::Color;
use strata_engine::queue::source::{
    LayerTheme, LegacyItem, LegacyObject, ParticleSystem, Player, ScriptObject, Tile,
    WaterSurface, TAG_GIZMO, TAG_RENDERABLE,
};
use strata_engine::queue::{Frame, Passability, TileLayer};
use strata_engine::render::Canvas;

use crate::sprites;

const LEVEL_WIDTH: f32 = 1600.0;
const GROUND_Y: f32 = 192.0;
const TILE: f32 = 16.0;
const HERO_SPEED: f32 = 90.0;

/// Draws the whole of `image` (`size` pixels) at a world position.
fn blit(canvas: &mut dyn Canvas, camera: Vec2, image: &str, size: Vec2, world: Vec2, tint: Color) {
    let screen = canvas.screen_size().world_to_screen(camera, world);
    canvas.draw_image(
        image,
        Rect::from_origin_size(Vec2::zero(), size),
        Rect::from_origin_size(screen, size),
        tint,
    );
}

fn outline(canvas: &mut dyn Canvas, camera: Vec2, world: Rect, color: Color) {
    let o = canvas.screen_size().world_to_screen(camera, world.origin);
    let (w, h) = (world.size.x, world.size.y);
    canvas.fill_rect(Rect::new(o.x, o.y, w, 1.0), color);
    canvas.fill_rect(Rect::new(o.x, o.y + h - 1.0, w, 1.0), color);
    canvas.fill_rect(Rect::new(o.x, o.y, 1.0, h), color);
    canvas.fill_rect(Rect::new(o.x + w - 1.0, o.y, 1.0, h), color);
}

pub struct Brick {
    position: Vec2,
    image: &'static str,
    passability: Passability,
    layer: TileLayer,
    depth: f32,
    /// Horizontal travel of a moving brick; `None` for static bricks.
    travel: Option<(f32, f32)>,
}

impl Brick {
    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, Vec2::new(TILE, TILE))
    }
}

impl Tile for Brick {
    fn base_depth(&self) -> f32 {
        self.depth
    }

    fn passability(&self) -> Passability {
        self.passability
    }

    fn layer(&self) -> TileLayer {
        self.layer
    }

    fn is_static(&self) -> bool {
        self.travel.is_none()
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn image_path(&self) -> &str {
        self.image
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        blit(canvas, camera, self.image, Vec2::new(TILE, TILE), self.position, Color::WHITE);
    }

    fn render_mask(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let color = match self.passability {
            Passability::Solid => Color::from_straight(1.0, 0.0, 0.0, 0.35),
            Passability::Cloud => Color::from_straight(0.0, 0.0, 1.0, 0.35),
            Passability::Passable => return,
        };
        let o = canvas.screen_size().world_to_screen(camera, self.position);
        canvas.fill_rect(Rect::from_origin_size(o, Vec2::new(TILE, TILE)), color);
    }

    fn render_debug(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        outline(canvas, camera, self.bounds(), Color::from_straight(1.0, 1.0, 0.0, 0.8));
    }

    fn render_path(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let Some((from, to)) = self.travel else { return };
        let a = canvas
            .screen_size()
            .world_to_screen(camera, Vec2::new(from, self.position.y + TILE * 0.5));
        canvas.fill_rect(
            Rect::new(a.x, a.y, to - from + TILE, 1.0),
            Color::from_straight(1.0, 1.0, 1.0, 0.6),
        );
    }
}

pub struct Hero {
    position: Vec2,
    direction: f32,
    frame: usize,
    anim_time: f32,
}

impl Player for Hero {
    fn is_dying(&self) -> bool {
        false
    }

    fn image_path(&self) -> &str {
        sprites::HERO[self.frame]
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        blit(
            canvas,
            camera,
            self.image_path(),
            Vec2::new(16.0, 24.0),
            self.position,
            Color::WHITE,
        );
    }
}

struct Spark {
    position: Vec2,
    velocity: Vec2,
    life: f32,
}

#[derive(Default)]
pub struct Sparks {
    sparks: Vec<Spark>,
    seed: u32,
}

impl Sparks {
    fn emit(&mut self, at: Vec2) {
        // xorshift; good enough for dust.
        self.seed ^= self.seed << 13;
        self.seed ^= self.seed >> 17;
        self.seed ^= self.seed << 5;
        let spread = (self.seed % 1000) as f32 / 1000.0 - 0.5;
        self.sparks.push(Spark {
            position: at,
            velocity: Vec2::new(spread * 40.0, -30.0 - spread.abs() * 20.0),
            life: 0.6,
        });
    }

    fn update(&mut self, dt: f32) {
        for s in &mut self.sparks {
            s.velocity.y += 120.0 * dt;
            s.position = s.position + s.velocity * dt;
            s.life -= dt;
        }
        self.sparks.retain(|s| s.life > 0.0);
    }
}

impl ParticleSystem for Sparks {
    fn is_empty(&self) -> bool {
        self.sparks.is_empty()
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let screen = canvas.screen_size();
        for s in &self.sparks {
            let p = screen.world_to_screen(camera, s.position);
            let color = Color::from_straight(0.9, 0.8, 0.6, (s.life / 0.6).clamp(0.0, 1.0));
            canvas.fill_rect(Rect::new(p.x, p.y, 2.0, 2.0), color);
        }
    }
}

pub struct Ring {
    position: Vec2,
    behind: bool,
}

impl LegacyItem for Ring {
    fn send_to_back(&self) -> bool {
        self.behind
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn image_path(&self) -> Option<&str> {
        Some(sprites::RING)
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        blit(canvas, camera, sprites::RING, Vec2::new(12.0, 12.0), self.position, Color::WHITE);
    }
}

pub struct Crate {
    position: Vec2,
}

impl LegacyObject for Crate {
    fn depth(&self) -> f32 {
        0.4
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn image_path(&self) -> Option<&str> {
        Some(sprites::CRATE)
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        blit(canvas, camera, sprites::CRATE, Vec2::new(16.0, 16.0), self.position, Color::WHITE);
    }
}

/// Hovering companion, translucent and drawn in front of the hero.
pub struct Drone {
    position: Vec2,
}

impl ScriptObject for Drone {
    fn has_tag(&self, tag: &str) -> bool {
        tag == TAG_RENDERABLE || tag == TAG_GIZMO
    }

    fn depth(&self) -> f32 {
        0.75
    }

    fn alpha(&self) -> Option<f32> {
        Some(0.6)
    }

    fn image_path(&self) -> Option<&str> {
        Some(sprites::DRONE)
    }

    fn debug_image_path(&self) -> Option<&str> {
        Some(sprites::DRONE)
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let tint = Color::WHITE.faded(0.6);
        blit(canvas, camera, sprites::DRONE, Vec2::new(16.0, 16.0), self.position, tint);
    }

    fn render_gizmos(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let c = canvas
            .screen_size()
            .world_to_screen(camera, self.position + Vec2::new(8.0, 8.0));
        let color = Color::from_straight(0.0, 1.0, 0.0, 1.0);
        canvas.fill_rect(Rect::new(c.x - 6.0, c.y, 13.0, 1.0), color);
        canvas.fill_rect(Rect::new(c.x, c.y - 6.0, 1.0, 13.0), color);
    }

    fn render_debug(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let bounds = Rect::from_origin_size(self.position, Vec2::new(16.0, 16.0));
        outline(canvas, camera, bounds, Color::from_straight(1.0, 0.0, 1.0, 0.8));
    }
}

pub struct Theme;

impl LayerTheme for Theme {
    fn render_background(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let screen = canvas.screen_size();
        // Horizon band, then hills scrolling at half speed.
        canvas.fill_rect(
            Rect::new(0.0, screen.height * 0.5, screen.width, screen.height * 0.5),
            Color::from_rgba_u8(150, 200, 230, 255),
        );
        let scroll = (camera.x * 0.5) % 64.0;
        let mut x = -scroll;
        while x < screen.width {
            canvas.draw_image(
                sprites::HILLS,
                Rect::new(0.0, 0.0, 64.0, 64.0),
                Rect::new(x, GROUND_Y - 96.0, 64.0, 64.0),
                Color::WHITE,
            );
            x += 64.0;
        }
    }

    fn render_foreground(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        let screen = canvas.screen_size();
        let scroll = (camera.x * 1.25) % 96.0;
        let mut x = -scroll;
        while x < screen.width {
            canvas.draw_image(
                sprites::GRASS,
                Rect::new(0.0, 0.0, 32.0, 16.0),
                Rect::new(x, screen.height - 16.0, 32.0, 16.0),
                Color::WHITE,
            );
            x += 96.0;
        }
    }
}

pub struct Lake {
    level: f32,
}

impl WaterSurface for Lake {
    fn level(&self) -> f32 {
        self.level
    }

    fn color(&self) -> Color {
        Color::from_straight(0.2, 0.4, 0.9, 0.45)
    }
}

pub struct Level {
    bricks: Vec<Brick>,
    hero: Hero,
    sparks: Sparks,
    rings: Vec<Ring>,
    crates: Vec<Crate>,
    drone: Drone,
    theme: Theme,
    lake: Lake,
    time: f64,
}

impl Level {
    pub fn new() -> Self {
        let mut bricks = Vec::new();

        let columns = (LEVEL_WIDTH / TILE) as usize;
        for i in 0..columns {
            // Gaps let the lake show through.
            if i % 23 >= 20 {
                continue;
            }
            let x = i as f32 * TILE;
            for row in 0..2 {
                bricks.push(Brick {
                    position: Vec2::new(x, GROUND_Y + row as f32 * TILE),
                    image: if row == 0 { sprites::GROUND } else { sprites::STONE },
                    passability: Passability::Solid,
                    layer: TileLayer::Default,
                    depth: 0.5,
                    travel: None,
                });
            }
        }

        for (n, x) in (0..12).map(|n| (n, 120.0 + n as f32 * 130.0)) {
            let layer = if n % 2 == 0 { TileLayer::Green } else { TileLayer::Yellow };
            for k in 0..3 {
                bricks.push(Brick {
                    position: Vec2::new(x + k as f32 * TILE, 140.0),
                    image: sprites::CLOUD,
                    passability: Passability::Cloud,
                    layer,
                    depth: 0.5,
                    travel: None,
                });
            }
        }

        // A pillar in front of the hero.
        for k in 0..3 {
            bricks.push(Brick {
                position: Vec2::new(700.0, GROUND_Y - (k + 1) as f32 * TILE),
                image: sprites::STONE,
                passability: Passability::Passable,
                layer: TileLayer::Default,
                depth: 0.6,
                travel: None,
            });
        }

        bricks.push(Brick {
            position: Vec2::new(400.0, 100.0),
            image: sprites::STONE,
            passability: Passability::Solid,
            layer: TileLayer::Default,
            depth: 0.5,
            travel: Some((400.0, 520.0)),
        });

        let rings = (0..20)
            .map(|n| Ring {
                position: Vec2::new(60.0 + n as f32 * 75.0, GROUND_Y - 40.0),
                behind: n % 3 == 0,
            })
            .collect();

        let crates = [260.0, 610.0, 980.0, 1350.0]
            .into_iter()
            .map(|x| Crate {
                position: Vec2::new(x, GROUND_Y - TILE),
            })
            .collect();

        Self {
            bricks,
            hero: Hero {
                position: Vec2::new(40.0, GROUND_Y - 24.0),
                direction: 1.0,
                frame: 0,
                anim_time: 0.0,
            },
            sparks: Sparks {
                seed: 0x2545_f491,
                ..Sparks::default()
            },
            rings,
            crates,
            drone: Drone {
                position: Vec2::zero(),
            },
            theme: Theme,
            lake: Lake {
                level: GROUND_Y + 2.0 * TILE + 4.0,
            },
            time: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt as f64;

        let hero = &mut self.hero;
        hero.position.x += hero.direction * HERO_SPEED * dt;
        if hero.position.x > LEVEL_WIDTH - 40.0 {
            hero.direction = -1.0;
        } else if hero.position.x < 40.0 {
            hero.direction = 1.0;
        }
        hero.anim_time += dt;
        if hero.anim_time >= 0.15 {
            hero.anim_time -= 0.15;
            hero.frame = 1 - hero.frame;
            self.sparks.emit(hero.position + Vec2::new(8.0, 24.0));
        }
        self.sparks.update(dt);

        let bob = (self.time * 3.0).sin() as f32 * 4.0;
        self.drone.position = self.hero.position + Vec2::new(-18.0 * self.hero.direction, -22.0 + bob);

        for brick in &mut self.bricks {
            if let Some((from, to)) = brick.travel {
                let t = ((self.time * 0.5).sin() as f32 + 1.0) * 0.5;
                brick.position.x = from + (to - from) * t;
            }
        }
    }

    /// Camera center, following the hero horizontally.
    pub fn camera(&self, screen: Viewport) -> Vec2 {
        let half = screen.width * 0.5;
        let x = self.hero.position.x.clamp(half, LEVEL_WIDTH - half);
        Vec2::new(x, screen.height * 0.5)
    }

    /// Queues everything on screen.
    pub fn enqueue<'a>(&'a self, frame: &mut Frame<'_, 'a>, screen: Viewport, debug: bool) {
        let camera = frame.camera();

        frame.enqueue_background(&self.theme);

        for brick in self.bricks.iter().filter(|b| screen.is_visible(camera, b.bounds())) {
            frame.enqueue_tile(brick);
            if debug {
                frame.enqueue_tile_mask(brick);
                frame.enqueue_tile_debug(brick);
                frame.enqueue_tile_path(brick);
            }
        }

        for ring in &self.rings {
            frame.enqueue_item(ring);
        }
        for c in &self.crates {
            frame.enqueue_object(c);
        }

        frame.enqueue_script(&self.drone);
        if debug {
            frame.enqueue_script_debug(&self.drone);
            frame.enqueue_gizmo(&self.drone);
        }

        frame.enqueue_player(&self.hero);
        frame.enqueue_particles(&self.sparks);
        frame.enqueue_water(&self.lake);
        frame.enqueue_foreground(&self.theme);
    }
}
