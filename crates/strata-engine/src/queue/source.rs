//! Collaborator traits implemented by the subsystems that feed the queue.
//!
//! The queue only borrows these objects for one frame. Every query is called
//! once at enqueue time; `render*` is called once when the frame ends.

use crate::coords::Vec2;
use crate::paint::Color;
use crate::render::Canvas;

use super::{Passability, TileLayer};

/// Script objects must carry this tag to be drawn at all.
pub const TAG_RENDERABLE: &str = "renderable";

/// Script objects carrying this tag have their gizmos drawn.
pub const TAG_GIZMO: &str = "gizmo";

pub trait Player {
    fn is_dying(&self) -> bool;

    /// Path of the current animation frame's image.
    fn image_path(&self) -> &str;

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas);
}

/// A brick of level terrain.
pub trait Tile {
    /// Depth authored in the level file.
    fn base_depth(&self) -> f32;

    fn passability(&self) -> Passability;

    fn layer(&self) -> TileLayer;

    /// Static tiles never move; they sort one step behind moving tiles.
    fn is_static(&self) -> bool;

    /// Top-left world position.
    fn position(&self) -> Vec2;

    fn image_path(&self) -> &str;

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas);

    /// Collision mask overlay (editor).
    fn render_mask(&self, camera: Vec2, canvas: &mut dyn Canvas);

    /// Bounding-box outline (editor).
    fn render_debug(&self, camera: Vec2, canvas: &mut dyn Canvas);

    /// Movement path of a moving tile (editor).
    fn render_path(&self, camera: Vec2, canvas: &mut dyn Canvas);
}

pub trait ParticleSystem {
    fn is_empty(&self) -> bool;

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas);
}

/// Built-in item such as a ring or a spring.
pub trait LegacyItem {
    /// Items that ask to be behind the player.
    fn send_to_back(&self) -> bool;

    fn position(&self) -> Vec2;

    fn image_path(&self) -> Option<&str>;

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas);
}

/// Object defined by the old object-script format.
pub trait LegacyObject {
    fn depth(&self) -> f32;

    fn position(&self) -> Vec2;

    fn image_path(&self) -> Option<&str>;

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas);
}

/// Object driven by the scripting VM.
///
/// Only `has_tag`, `depth` and `render` are required; scripts that do not
/// expose the other queries keep the defaults (visible, opaque, no image).
pub trait ScriptObject {
    fn has_tag(&self, tag: &str) -> bool;

    fn depth(&self) -> f32;

    fn visible(&self) -> Option<bool> {
        None
    }

    /// Opacity in `[0, 1]`.
    fn alpha(&self) -> Option<f32> {
        None
    }

    fn image_path(&self) -> Option<&str> {
        None
    }

    /// Image drawn by the debug outline (usually a preview sprite).
    fn debug_image_path(&self) -> Option<&str> {
        None
    }

    fn render(&self, camera: Vec2, canvas: &mut dyn Canvas);

    fn render_gizmos(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}

    fn render_debug(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}
}

/// Parallax layers of a level.
pub trait LayerTheme {
    fn render_background(&self, camera: Vec2, canvas: &mut dyn Canvas);

    fn render_foreground(&self, camera: Vec2, canvas: &mut dyn Canvas);
}

/// Water line of a level. The queue draws the water itself.
pub trait WaterSurface {
    /// World y of the water line.
    fn level(&self) -> f32;

    /// Premultiplied fill color.
    fn color(&self) -> Color;
}
