use super::EntryStore;

/// Reorders entries for the depth-buffer path.
///
/// On return `zorder[e]` is entry `e`'s position in paint order, and `order`
/// lists entries as: opaque before translucent, then by image, then by depth
/// (opaque front-to-back, translucent back-to-front), then by `zorder`.
/// Returns the split: every entry from it onward is translucent.
pub fn partition(store: &EntryStore<'_>, order: &mut Vec<u32>, zorder: &mut Vec<u32>) -> usize {
    let sorted = store.sorted();

    zorder.clear();
    zorder.resize(sorted.len(), 0);
    for (pos, &entry) in sorted.iter().enumerate() {
        zorder[entry as usize] = pos as u32;
    }

    order.clear();
    order.extend_from_slice(sorted);
    order.sort_unstable_by(|&a, &b| {
        let ea = store.entry(a);
        let eb = store.entry(b);

        ea.is_translucent()
            .cmp(&eb.is_translucent())
            .then_with(|| ea.image().cmp(&eb.image()))
            .then_with(|| {
                if ea.is_translucent() {
                    ea.depth().cmp_bucket(eb.depth())
                } else {
                    eb.depth().cmp_bucket(ea.depth())
                }
            })
            .then_with(|| zorder[a as usize].cmp(&zorder[b as usize]))
    });

    split_point(order, |e| store.entry(e).is_translucent())
}

/// First index of the translucent tail, scanning from the end.
pub fn split_point(order: &[u32], translucent: impl Fn(u32) -> bool) -> usize {
    order
        .iter()
        .rposition(|&e| !translucent(e))
        .map_or(0, |last_opaque| last_opaque + 1)
}

/// Normalized depth of the entry at paint position `zorder` out of `n`.
///
/// The first entry painted gets 1 (farthest); the last gets 0.
#[inline]
pub fn normalized_depth(zorder: u32, n: usize) -> f32 {
    if n <= 1 {
        return 1.0;
    }
    1.0 - zorder as f32 / (n - 1) as f32
}

/// Maps a normalized depth from `[0, 1]` to clip space `[-1, 1]`.
#[inline]
pub fn to_clip(z: f32) -> f32 {
    2.0 * z - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::queue::source::ScriptObject;
    use crate::queue::{Entry, Renderable};
    use crate::render::Canvas;

    struct Sprite {
        depth: f32,
        alpha: f32,
        image: &'static str,
    }

    impl ScriptObject for Sprite {
        fn has_tag(&self, _tag: &str) -> bool {
            true
        }
        fn depth(&self) -> f32 {
            self.depth
        }
        fn alpha(&self) -> Option<f32> {
            Some(self.alpha)
        }
        fn image_path(&self) -> Option<&str> {
            Some(self.image)
        }
        fn render(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}
    }

    fn store(sprites: &[Sprite]) -> EntryStore<'_> {
        let mut store = EntryStore::with_capacity(sprites.len(), Vec::new());
        for (i, s) in sprites.iter().enumerate() {
            store.push(Entry::new(Renderable::ScriptObject(s), i as u32).0);
        }
        store
    }

    fn sprite(depth: f32, alpha: f32, image: &'static str) -> Sprite {
        Sprite { depth, alpha, image }
    }

    #[test]
    fn opaque_front_to_back_translucent_back_to_front() {
        let sprites = [
            sprite(0.1, 1.0, "a"),
            sprite(0.3, 0.5, "a"),
            sprite(0.2, 1.0, "a"),
            sprite(0.4, 0.5, "a"),
            sprite(0.2, 0.5, "a"),
        ];
        let store = store(&sprites);
        let (mut order, mut zorder) = (Vec::new(), Vec::new());

        let split = partition(&store, &mut order, &mut zorder);

        assert_eq!(split, 2);
        assert_eq!(order, vec![2, 0, 4, 1, 3]);
        assert_eq!(zorder, vec![0, 3, 1, 4, 2]);
    }

    #[test]
    fn groups_images_within_each_half() {
        let sprites = [
            sprite(0.1, 1.0, "b"),
            sprite(0.2, 1.0, "a"),
            sprite(0.3, 1.0, "b"),
            sprite(0.4, 1.0, "a"),
        ];
        let store = store(&sprites);
        let (mut order, mut zorder) = (Vec::new(), Vec::new());

        assert_eq!(partition(&store, &mut order, &mut zorder), 4);
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn split_separates_every_translucency_pattern() {
        for mask in 0u32..(1 << 6) {
            let sprites: Vec<Sprite> = (0..6)
                .map(|i| {
                    let alpha = if mask & (1 << i) != 0 { 0.5 } else { 1.0 };
                    sprite(i as f32 * 0.1, alpha, if i % 2 == 0 { "x" } else { "y" })
                })
                .collect();
            let store = store(&sprites);
            let (mut order, mut zorder) = (Vec::new(), Vec::new());

            let split = partition(&store, &mut order, &mut zorder);

            assert_eq!(split, 6 - mask.count_ones() as usize, "mask {mask:06b}");
            for (i, &e) in order.iter().enumerate() {
                assert_eq!(store.entry(e).is_translucent(), i >= split, "mask {mask:06b}");
            }
        }
    }

    #[test]
    fn normalized_depth_spans_far_to_near() {
        assert_eq!(normalized_depth(0, 1), 1.0);
        assert_eq!(normalized_depth(0, 5), 1.0);
        assert_eq!(normalized_depth(4, 5), 0.0);
        assert_eq!(normalized_depth(2, 5), 0.5);
        assert_eq!(to_clip(1.0), 1.0);
        assert_eq!(to_clip(0.0), -1.0);
    }
}
