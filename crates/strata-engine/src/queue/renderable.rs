use crate::coords::{Rect, Vec2, Viewport};
use crate::render::Canvas;

use super::depth::{self, tile_offset};
use super::source::{
    LayerTheme, LegacyItem, LegacyObject, ParticleSystem, Player, ScriptObject, Tile,
    WaterSurface, TAG_GIZMO, TAG_RENDERABLE,
};
use super::{ImageKey, RenderableKind};

/// Borrowed handle to one drawable thing.
///
/// Each variant maps to exactly one [`RenderableKind`]. The queue never owns
/// the referenced object.
#[derive(Copy, Clone)]
pub enum Renderable<'a> {
    Player(&'a dyn Player),
    Tile(&'a dyn Tile),
    TileMask(&'a dyn Tile),
    TileDebug(&'a dyn Tile),
    TilePath(&'a dyn Tile),
    Particles(&'a dyn ParticleSystem),
    LegacyItem(&'a dyn LegacyItem),
    LegacyObject(&'a dyn LegacyObject),
    ScriptObject(&'a dyn ScriptObject),
    ScriptDebug(&'a dyn ScriptObject),
    ScriptGizmo(&'a dyn ScriptObject),
    Background(&'a dyn LayerTheme),
    Foreground(&'a dyn LayerTheme),
    Water(&'a dyn WaterSurface),
}

impl<'a> Renderable<'a> {
    pub fn kind(&self) -> RenderableKind {
        match self {
            Renderable::Player(_) => RenderableKind::Player,
            Renderable::Tile(_) => RenderableKind::Tile,
            Renderable::TileMask(_) => RenderableKind::TileMask,
            Renderable::TileDebug(_) => RenderableKind::TileDebug,
            Renderable::TilePath(_) => RenderableKind::TilePath,
            Renderable::Particles(_) => RenderableKind::Particles,
            Renderable::LegacyItem(_) => RenderableKind::LegacyItem,
            Renderable::LegacyObject(_) => RenderableKind::LegacyObject,
            Renderable::ScriptObject(_) => RenderableKind::ScriptObject,
            Renderable::ScriptDebug(_) => RenderableKind::ScriptDebug,
            Renderable::ScriptGizmo(_) => RenderableKind::ScriptGizmo,
            Renderable::Background(_) => RenderableKind::Background,
            Renderable::Foreground(_) => RenderableKind::Foreground,
            Renderable::Water(_) => RenderableKind::Water,
        }
    }

    /// Whether this renderable should be queued at all this frame.
    pub fn is_admitted(&self, camera: Vec2, screen: Viewport) -> bool {
        match self {
            Renderable::Particles(p) => !p.is_empty(),
            Renderable::ScriptObject(o) => {
                o.has_tag(TAG_RENDERABLE) && o.visible() != Some(false)
            }
            Renderable::ScriptGizmo(o) => o.has_tag(TAG_GIZMO),
            Renderable::Water(w) => water_line(w.level(), camera, screen) < screen.height,
            _ => true,
        }
    }

    /// Raw depth key as reported by the collaborator. May be non-finite.
    pub fn depth(&self) -> f32 {
        match self {
            Renderable::Player(p) => {
                if p.is_dying() {
                    depth::FOREGROUND - depth::offset(1)
                } else {
                    depth::MIDGROUND
                }
            }
            Renderable::Tile(t) | Renderable::TileDebug(t) => t.base_depth() + tile_nudge(*t),
            Renderable::TileMask(t) => depth::LARGE + tile_nudge(*t),
            Renderable::TilePath(t) => depth::LARGE + tile_nudge(*t) + 1.0,
            Renderable::Particles(_) => depth::FOREGROUND,
            Renderable::LegacyItem(i) => {
                if i.send_to_back() {
                    depth::MIDGROUND - depth::offset(1)
                } else {
                    depth::MIDGROUND
                }
            }
            Renderable::LegacyObject(o) => o.depth(),
            Renderable::ScriptObject(o) | Renderable::ScriptDebug(o) => o.depth(),
            Renderable::ScriptGizmo(_) => depth::LARGE,
            Renderable::Background(_) => depth::BACKGROUND,
            Renderable::Foreground(_) | Renderable::Water(_) => depth::FOREGROUND,
        }
    }

    /// Vertical position used to order same-kind entries at equal depth.
    pub fn vertical_position(&self) -> i32 {
        let y = match self {
            Renderable::Tile(t)
            | Renderable::TileMask(t)
            | Renderable::TileDebug(t)
            | Renderable::TilePath(t) => t.position().y,
            Renderable::LegacyItem(i) => i.position().y,
            Renderable::LegacyObject(o) => o.position().y,
            _ => 0.0,
        };

        // Saturating cast; NaN lands on 0.
        y.floor() as i32
    }

    /// `serial` makes synthetic identities unique to the entry.
    pub fn image(&self, serial: u32) -> ImageKey<'a> {
        let kind = self.kind();
        let path = match *self {
            Renderable::Player(p) => Some(p.image_path()),
            Renderable::Tile(t) | Renderable::TileDebug(t) => Some(t.image_path()),
            Renderable::LegacyItem(i) => i.image_path(),
            Renderable::LegacyObject(o) => o.image_path(),
            Renderable::ScriptObject(o) => o.image_path(),
            Renderable::ScriptDebug(o) => o.debug_image_path(),
            Renderable::TileMask(_)
            | Renderable::TilePath(_)
            | Renderable::Particles(_)
            | Renderable::ScriptGizmo(_)
            | Renderable::Background(_)
            | Renderable::Foreground(_)
            | Renderable::Water(_) => None,
        };

        ImageKey::path_or_synthetic(path, kind, serial)
    }

    pub fn is_translucent(&self) -> bool {
        match self {
            Renderable::Water(_) => true,
            // NaN alpha is not below 1, so it stays opaque.
            Renderable::ScriptObject(o) | Renderable::ScriptDebug(o) => {
                o.alpha().is_some_and(|a| a < 1.0)
            }
            _ => false,
        }
    }

    pub fn render(&self, camera: Vec2, canvas: &mut dyn Canvas) {
        match self {
            Renderable::Player(p) => p.render(camera, canvas),
            Renderable::Tile(t) => t.render(camera, canvas),
            Renderable::TileMask(t) => t.render_mask(camera, canvas),
            Renderable::TileDebug(t) => t.render_debug(camera, canvas),
            Renderable::TilePath(t) => t.render_path(camera, canvas),
            Renderable::Particles(p) => p.render(camera, canvas),
            Renderable::LegacyItem(i) => i.render(camera, canvas),
            Renderable::LegacyObject(o) => o.render(camera, canvas),
            Renderable::ScriptObject(o) => o.render(camera, canvas),
            Renderable::ScriptDebug(o) => o.render_debug(camera, canvas),
            Renderable::ScriptGizmo(o) => o.render_gizmos(camera, canvas),
            Renderable::Background(l) => l.render_background(camera, canvas),
            Renderable::Foreground(l) => l.render_foreground(camera, canvas),
            Renderable::Water(w) => render_water(*w, camera, canvas),
        }
    }
}

impl core::fmt::Debug for Renderable<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Renderable::{}", self.kind())
    }
}

fn tile_nudge(tile: &dyn Tile) -> f32 {
    tile_offset(tile.passability(), tile.layer(), tile.is_static())
}

/// Screen-space y of the water line.
fn water_line(level: f32, camera: Vec2, screen: Viewport) -> f32 {
    screen.world_to_screen(camera, Vec2::new(0.0, level)).y
}

/// Fills from the water line (clamped to the top of the screen) to the bottom.
fn render_water(water: &dyn WaterSurface, camera: Vec2, canvas: &mut dyn Canvas) {
    let screen = canvas.screen_size();
    let y = water_line(water.level(), camera, screen).max(0.0);

    if y >= screen.height {
        return;
    }

    canvas.fill_rect(Rect::new(0.0, y, screen.width, screen.height - y), water.color());
}
