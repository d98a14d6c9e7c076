use core::cmp::Ordering;

/// Depth distance of `n` minimum steps.
#[inline]
pub const fn offset(n: i32) -> f32 {
    0.000001 * n as f32
}

/// Depth reserved for overlays that must stay in front of the level.
pub const LARGE: f32 = 99999.0;

/// Keys closer than this compare as the same depth.
pub const EPSILON: f32 = offset(1) / 10.0;

pub const BACKGROUND: f32 = 0.0;
pub const MIDGROUND: f32 = 0.5;
pub const FOREGROUND: f32 = 1.0;

/// Back-to-front depth key.
///
/// Smaller keys are drawn first. The value is always finite: non-finite
/// inputs are replaced on construction (NaN becomes [`MIDGROUND`], infinities
/// saturate), and [`DepthKey::bucket`] quantizes it to epsilon steps so
/// ordering is a total order over integers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DepthKey(f32);

impl DepthKey {
    /// Wraps a collaborator depth. Returns the sanitized key and whether the
    /// input had to be replaced.
    #[inline]
    pub fn sanitize(value: f32) -> (Self, bool) {
        if value.is_finite() {
            (Self(value), false)
        } else if value.is_nan() {
            (Self(MIDGROUND), true)
        } else if value > 0.0 {
            (Self(f32::MAX), true)
        } else {
            (Self(f32::MIN), true)
        }
    }

    /// Wraps a value the queue computed itself.
    #[inline]
    pub(crate) const fn trusted(value: f32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Depth quantized to epsilon steps.
    ///
    /// Keys more than epsilon apart always map to different buckets, in the
    /// same direction. `f32::MAX / EPSILON` still fits an `i64` saturating
    /// cast, so the extremes stay ordered.
    #[inline]
    pub fn bucket(self) -> i64 {
        (self.0 as f64 / EPSILON as f64).round() as i64
    }

    /// Compares depth buckets (back-to-front).
    #[inline]
    pub fn cmp_bucket(self, other: Self) -> Ordering {
        self.bucket().cmp(&other.bucket())
    }
}

/// Collision behaviour of a tile, as far as depth is concerned.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Passability {
    Passable,
    Cloud,
    #[default]
    Solid,
}

/// Collision layer of a tile.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TileLayer {
    #[default]
    Default,
    Yellow,
    Green,
}

/// Depth nudge applied to tiles sharing a base depth.
///
/// Layer dominates passability. Static tiles sit one step behind moving ones.
pub fn tile_offset(passability: Passability, layer: TileLayer, is_static: bool) -> f32 {
    let by_type = match passability {
        Passability::Passable => -20,
        Passability::Cloud => -10,
        Passability::Solid => 0,
    };

    let by_layer = match layer {
        TileLayer::Yellow => -50,
        TileLayer::Green => 50,
        TileLayer::Default => 0,
    };

    let by_motion = if is_static { -1 } else { 0 };

    offset(by_type + by_layer + by_motion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_scale_linearly() {
        assert_eq!(offset(0), 0.0);
        assert!((offset(20) - 0.00002).abs() < 1e-9);
        assert!((EPSILON - 1e-7).abs() < 1e-12);
    }

    #[test]
    fn nan_becomes_midground() {
        let (key, replaced) = DepthKey::sanitize(f32::NAN);
        assert!(replaced);
        assert_eq!(key.value(), MIDGROUND);
    }

    #[test]
    fn infinities_saturate_in_order() {
        let (hi, a) = DepthKey::sanitize(f32::INFINITY);
        let (lo, b) = DepthKey::sanitize(f32::NEG_INFINITY);
        let (mid, c) = DepthKey::sanitize(LARGE);
        assert!(a && b && !c);
        assert_eq!(lo.cmp_bucket(mid), Ordering::Less);
        assert_eq!(mid.cmp_bucket(hi), Ordering::Less);
    }

    #[test]
    fn keys_apart_by_more_than_epsilon_never_share_a_bucket() {
        let bases = [0.0f32, 0.5, 1.0, -3.0];
        for base in bases {
            let a = DepthKey::trusted(base);
            let b = DepthKey::trusted(base + offset(1));
            assert_eq!(a.cmp_bucket(b), Ordering::Less, "base {base}");
        }
    }

    #[test]
    fn layer_dominates_passability() {
        let yellow_solid = tile_offset(Passability::Solid, TileLayer::Yellow, false);
        let default_passable = tile_offset(Passability::Passable, TileLayer::Default, true);
        let green_passable = tile_offset(Passability::Passable, TileLayer::Green, true);
        let default_solid = tile_offset(Passability::Solid, TileLayer::Default, false);

        assert!(yellow_solid < default_passable);
        assert!(green_passable > default_solid);
    }

    #[test]
    fn static_tiles_sit_behind_moving_ones() {
        let moving = tile_offset(Passability::Cloud, TileLayer::Default, false);
        let fixed = tile_offset(Passability::Cloud, TileLayer::Default, true);
        assert!(fixed < moving);
        assert!((moving - fixed - offset(1)).abs() < 1e-9);
    }
}
