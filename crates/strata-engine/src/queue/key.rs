use core::cmp::Ordering;

use super::{DepthKey, RenderableKind};

/// Paint-order key of a queued entry.
///
/// Ordering rules, all ascending:
/// 1) depth bucket (back-to-front)
/// 2) non-player before player
/// 3) kind rank (shared by all kinds without a vertical position)
/// 4) vertical position
///
/// Equal keys keep submission order (the store inserts stably).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SortKey {
    pub bucket: i64,
    pub player: bool,
    pub rank: u8,
    pub ypos: i32,
}

impl SortKey {
    #[inline]
    pub fn new(depth: DepthKey, kind: RenderableKind, ypos: i32) -> Self {
        Self {
            bucket: depth.bucket(),
            player: kind.is_player(),
            rank: kind.rank(),
            ypos,
        }
    }
}

impl Ord for SortKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.bucket
            .cmp(&other.bucket)
            .then(self.player.cmp(&other.player))
            .then(self.rank.cmp(&other.rank))
            .then(self.ypos.cmp(&other.ypos))
    }
}

impl PartialOrd for SortKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::depth::{offset, EPSILON};

    fn key(depth: f32, kind: RenderableKind, ypos: i32) -> SortKey {
        SortKey::new(DepthKey::sanitize(depth).0, kind, ypos)
    }

    /// Small domain that hits every tie-break level, including keys inside
    /// and outside epsilon of each other.
    fn domain() -> Vec<SortKey> {
        let depths = [0.0, 0.5 - offset(1), 0.5, 0.5 + EPSILON * 0.3, 1.0, f32::NAN];
        let kinds = [
            RenderableKind::Tile,
            RenderableKind::LegacyItem,
            RenderableKind::ScriptObject,
            RenderableKind::Player,
        ];
        let ys = [-4, 1, 3, 5];

        let mut out = Vec::new();
        for d in depths {
            for k in kinds {
                for y in ys {
                    out.push(key(d, k, y));
                }
            }
        }
        out
    }

    #[test]
    fn strict_weak_order_over_domain() {
        let keys = domain();
        let lt = |a: &SortKey, b: &SortKey| a.cmp(b) == Ordering::Less;
        let eq = |a: &SortKey, b: &SortKey| !lt(a, b) && !lt(b, a);

        for a in &keys {
            assert!(!lt(a, a), "irreflexive");
            for b in &keys {
                if lt(a, b) {
                    assert!(!lt(b, a), "asymmetric");
                }
                for c in &keys {
                    if lt(a, b) && lt(b, c) {
                        assert!(lt(a, c), "transitive");
                    }
                    if eq(a, b) && eq(b, c) {
                        assert!(eq(a, c), "incomparability is transitive");
                    }
                }
            }
        }
    }

    #[test]
    fn depth_beyond_epsilon_wins_over_everything_else() {
        let back_player = key(0.5, RenderableKind::Player, 100);
        let front_tile = key(0.5 + offset(1), RenderableKind::Tile, -100);
        assert!(back_player < front_tile);
    }

    #[test]
    fn player_goes_on_top_at_equal_depth() {
        let player = key(0.5, RenderableKind::Player, 0);
        for kind in RenderableKind::ALL.iter().copied().filter(|k| !k.is_player()) {
            assert!(key(0.5, kind, 1000) < player, "{kind}");
        }
    }

    #[test]
    fn unpositioned_kinds_tie_at_equal_depth() {
        let layers = [
            RenderableKind::Foreground,
            RenderableKind::Particles,
            RenderableKind::Water,
            RenderableKind::ScriptObject,
        ];
        for a in layers {
            for b in layers {
                assert_eq!(key(1.0, a, 0).cmp(&key(1.0, b, 0)), Ordering::Equal, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn same_kind_orders_by_vertical_position() {
        assert!(key(10.0, RenderableKind::Tile, 1) < key(10.0, RenderableKind::Tile, 3));
        assert_eq!(
            key(10.0, RenderableKind::Tile, 3).cmp(&key(10.0, RenderableKind::Tile, 3)),
            Ordering::Equal
        );
    }
}
