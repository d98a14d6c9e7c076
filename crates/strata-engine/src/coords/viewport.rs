use super::{Rect, Vec2};

/// Screen size in logical pixels.
///
/// The camera position handed to the render queue is the world position shown
/// at the center of this viewport.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// World position of the top-left screen corner for a camera centered at `camera`.
    #[inline]
    pub fn top_left(self, camera: Vec2) -> Vec2 {
        camera - self.size() * 0.5
    }

    /// Converts a world position to screen space.
    #[inline]
    pub fn world_to_screen(self, camera: Vec2, world: Vec2) -> Vec2 {
        world - self.top_left(camera)
    }

    /// Returns `true` if a world-space rectangle overlaps the visible area.
    pub fn is_visible(self, camera: Vec2, world: Rect) -> bool {
        let screen = Rect::from_origin_size(self.world_to_screen(camera, world.origin), world.size);
        screen
            .intersect(Rect::new(0.0, 0.0, self.width, self.height))
            .is_some()
    }
}
