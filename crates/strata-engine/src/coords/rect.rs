use super::Vec2;

/// Axis-aligned rectangle, top-left origin, y down.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::from_origin_size(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle spanning two corners in any order.
    #[inline]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let lo = a.min(b);
        Self::from_origin_size(lo, a.max(b) - lo)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Same area with a non-negative size (a negative width flips the image).
    #[inline]
    pub fn normalized(self) -> Self {
        Self::from_corners(self.origin, self.origin + self.size)
    }

    /// Pixel region of an image of `extent` pixels as texture coordinates.
    #[inline]
    pub fn to_uv(self, extent: Vec2) -> Self {
        let sx = 1.0 / extent.x.max(1.0);
        let sy = 1.0 / extent.y.max(1.0);
        Rect::new(
            self.origin.x * sx,
            self.origin.y * sy,
            self.size.x * sx,
            self.size.y * sy,
        )
    }

    /// Overlap of two rectangles; `None` when they only touch or are apart.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let lo = a.origin.max(b.origin);
        let hi = (a.origin + a.size).min(b.origin + b.size);

        let overlap = Rect::from_origin_size(lo, hi - lo);
        (!overlap.is_empty()).then_some(overlap)
    }
}
