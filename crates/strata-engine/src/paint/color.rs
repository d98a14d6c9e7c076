/// Linear premultiplied RGBA color.
///
/// Invariant: `rgb` components are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::from_premul(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Creates a premultiplied color from straight RGBA bytes (`0`–`255`).
    ///
    /// Level files store water and tint colors this way.
    #[inline]
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Creates a color from already-premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Scales every channel by `opacity`, which keeps premultiplication intact.
    #[inline]
    pub fn faded(self, opacity: f32) -> Self {
        let k = opacity.clamp(0.0, 1.0);
        Self { r: self.r * k, g: self.g * k, b: self.b * k, a: self.a * k }
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
