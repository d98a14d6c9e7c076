use crate::coords::Vec2;
use crate::render::{Backend, DepthTest, ShaderDesc, ShaderId, WriteMask};

use super::batch::{encode_runs, Batches};
use super::partition::{normalized_depth, partition, to_clip};
use super::source::{
    LayerTheme, LegacyItem, LegacyObject, ParticleSystem, Player, ScriptObject, Tile,
    WaterSurface,
};
use super::{Entry, EntryStore, FrameStats, QueueConfig, Renderable};

/// Per-frame render scheduler.
///
/// One queue lives per rendering context. Each frame, [`RenderQueue::begin`]
/// opens a [`Frame`] that collects entries and submits them on
/// [`Frame::end`]. Scratch buffers and the entry capacity survive between
/// frames.
#[derive(Debug)]
pub struct RenderQueue {
    config: QueueConfig,
    shader: Option<ShaderId>,

    /// High-water entry capacity, preallocated by every frame.
    capacity: usize,

    sorted: Vec<u32>,
    order: Vec<u32>,
    runs: Vec<u32>,
    zorder: Vec<u32>,

    warned_non_finite: bool,
    last_stats: FrameStats,
}

impl RenderQueue {
    /// Creates the queue and its shader.
    ///
    /// Shader creation is attempted once. On failure the queue keeps working
    /// with the backend's default pipeline.
    pub fn new(config: QueueConfig, backend: &mut impl Backend) -> Self {
        let desc = ShaderDesc {
            alpha_test: config.uses_depth_buffer(),
        };

        let shader = match backend.create_shader(desc) {
            Ok(id) => Some(id),
            Err(err) => {
                log::warn!("render queue shader unavailable, using default pipeline: {err:#}");
                None
            }
        };

        log::info!(
            "render queue ready: capacity={}, deferred={}, depth buffer={}",
            config.initial_capacity,
            config.deferred_drawing,
            config.uses_depth_buffer(),
        );

        Self {
            capacity: config.initial_capacity.max(1),
            config,
            shader,
            sorted: Vec::new(),
            order: Vec::new(),
            runs: Vec::new(),
            zorder: Vec::new(),
            warned_non_finite: false,
            last_stats: FrameStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    #[inline]
    pub fn shader(&self) -> Option<ShaderId> {
        self.shader
    }

    /// Entries the next frame can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Statistics of the last frame that was ended.
    #[inline]
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Opens a frame session for a camera centered at `camera`.
    ///
    /// The frame borrows the queue, so only one session can be open at a time.
    pub fn begin<'a>(&mut self, camera: Vec2) -> Frame<'_, 'a> {
        let sorted = std::mem::take(&mut self.sorted);
        let store = EntryStore::with_capacity(self.capacity, sorted);

        Frame {
            queue: self,
            camera,
            store,
            ended: false,
        }
    }
}

/// An open frame session.
///
/// `'a` bounds every renderable enqueued in this frame.
#[derive(Debug)]
pub struct Frame<'q, 'a> {
    queue: &'q mut RenderQueue,
    camera: Vec2,
    store: EntryStore<'a>,
    ended: bool,
}

impl<'q, 'a> Frame<'q, 'a> {
    #[inline]
    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Entries in paint order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<'a>> {
        self.store.iter_sorted()
    }

    /// Queues a renderable if its admission filter accepts it.
    pub fn enqueue(&mut self, renderable: Renderable<'a>) -> bool {
        if !renderable.is_admitted(self.camera, self.queue.config.screen_size) {
            return false;
        }

        let serial = self.store.len() as u32;
        let (entry, replaced) = Entry::new(renderable, serial);

        if replaced && !self.queue.warned_non_finite {
            self.queue.warned_non_finite = true;
            log::warn!(
                "non-finite depth from {} replaced; further occurrences are not reported",
                entry.kind()
            );
        }

        self.store.push(entry);
        true
    }

    pub fn enqueue_player(&mut self, player: &'a dyn Player) -> bool {
        self.enqueue(Renderable::Player(player))
    }

    pub fn enqueue_tile(&mut self, tile: &'a dyn Tile) -> bool {
        self.enqueue(Renderable::Tile(tile))
    }

    pub fn enqueue_tile_mask(&mut self, tile: &'a dyn Tile) -> bool {
        self.enqueue(Renderable::TileMask(tile))
    }

    pub fn enqueue_tile_debug(&mut self, tile: &'a dyn Tile) -> bool {
        self.enqueue(Renderable::TileDebug(tile))
    }

    pub fn enqueue_tile_path(&mut self, tile: &'a dyn Tile) -> bool {
        self.enqueue(Renderable::TilePath(tile))
    }

    /// Skipped while the system has no particles.
    pub fn enqueue_particles(&mut self, particles: &'a dyn ParticleSystem) -> bool {
        self.enqueue(Renderable::Particles(particles))
    }

    pub fn enqueue_item(&mut self, item: &'a dyn LegacyItem) -> bool {
        self.enqueue(Renderable::LegacyItem(item))
    }

    pub fn enqueue_object(&mut self, object: &'a dyn LegacyObject) -> bool {
        self.enqueue(Renderable::LegacyObject(object))
    }

    /// Skipped unless tagged `renderable` and not reported invisible.
    pub fn enqueue_script(&mut self, object: &'a dyn ScriptObject) -> bool {
        self.enqueue(Renderable::ScriptObject(object))
    }

    pub fn enqueue_script_debug(&mut self, object: &'a dyn ScriptObject) -> bool {
        self.enqueue(Renderable::ScriptDebug(object))
    }

    /// Skipped unless tagged `gizmo`.
    pub fn enqueue_gizmo(&mut self, object: &'a dyn ScriptObject) -> bool {
        self.enqueue(Renderable::ScriptGizmo(object))
    }

    pub fn enqueue_background(&mut self, theme: &'a dyn LayerTheme) -> bool {
        self.enqueue(Renderable::Background(theme))
    }

    pub fn enqueue_foreground(&mut self, theme: &'a dyn LayerTheme) -> bool {
        self.enqueue(Renderable::Foreground(theme))
    }

    /// Skipped when the water line is at or below the bottom of the screen.
    pub fn enqueue_water(&mut self, water: &'a dyn WaterSurface) -> bool {
        self.enqueue(Renderable::Water(water))
    }

    /// Renders every entry and closes the session.
    pub fn end<B: Backend>(mut self, backend: &mut B) -> FrameStats {
        self.ended = true;

        let stats = if self.store.is_empty() {
            FrameStats::default()
        } else {
            self.submit(backend)
        };

        if self.queue.config.report_stats && stats.entries > 0 {
            log::debug!("frame: {stats}");
        }

        self.queue.last_stats = stats;
        stats
    }

    fn submit<B: Backend>(&mut self, backend: &mut B) -> FrameStats {
        let camera = self.camera;
        let store = &self.store;
        let queue = &mut *self.queue;

        let n = store.len();
        let deferred = queue.config.deferred_drawing;
        let depth_test = queue.config.uses_depth_buffer();
        let trace = queue.config.report_stats && log::log_enabled!(log::Level::Trace);

        backend.use_shader(queue.shader);

        let mut order = std::mem::take(&mut queue.order);
        let split = if depth_test {
            backend.set_depth_test(DepthTest::LessEqual);
            backend.set_write_mask(WriteMask::ColorAndDepth);
            backend.clear_depth(1.0);
            partition(store, &mut order, &mut queue.zorder)
        } else {
            order.clear();
            order.extend_from_slice(store.sorted());
            n
        };

        // With the depth buffer, runs never cross the opaque/translucent split.
        encode_runs(n, &mut queue.runs, |a, b| {
            let ea = store.entry(order[a]);
            let eb = store.entry(order[b]);
            ea.image() == eb.image()
                && (!depth_test || ea.is_translucent() == eb.is_translucent())
        });
        let batches = Batches::new(&queue.runs);

        for (i, &index) in order.iter().enumerate() {
            let entry = store.entry(index);

            if depth_test {
                if i == split {
                    backend.set_write_mask(WriteMask::Color);
                }
                let z = normalized_depth(queue.zorder[index as usize], n);
                backend.set_depth_offset(Some(to_clip(z)));
            }

            if deferred && batches.opens(i) {
                backend.hold_drawing(true);
            }

            if trace && batches.starts_draw_call(i) {
                log::trace!("batch {}: {} x{}", i, entry.image(), queue.runs[i]);
            }

            entry.renderable().render(camera, backend);

            if deferred && batches.closes(i) && backend.is_drawing_held() {
                backend.hold_drawing(false);
            }
        }

        if depth_test {
            backend.set_depth_offset(None);
            backend.set_depth_test(DepthTest::Disabled);
            backend.set_write_mask(WriteMask::ColorAndDepth);
        }
        backend.use_shader(None);

        let draw_calls = if deferred { batches.draw_calls() } else { n };
        queue.order = order;

        FrameStats {
            entries: n,
            draw_calls,
            depth_test,
        }
    }
}

impl Drop for Frame<'_, '_> {
    fn drop(&mut self) {
        if !self.ended && !self.store.is_empty() {
            log::warn!(
                "frame dropped without end; {} entries discarded",
                self.store.len()
            );
        }

        self.queue.capacity = self.queue.capacity.max(self.store.capacity());
        self.queue.sorted = self.store.take_sorted_buffer();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::coords::{Rect, Viewport};
    use crate::paint::Color;
    use crate::queue::source::{TAG_GIZMO, TAG_RENDERABLE};
    use crate::queue::{depth, Passability, RenderableKind, TileLayer};
    use crate::render::{BackendCall, Canvas, RecordingBackend};

    const SCREEN: Viewport = Viewport::new(426.0, 240.0);
    const CAMERA: Vec2 = Vec2::new(213.0, 120.0);

    type Log = RefCell<Vec<&'static str>>;

    fn blit(canvas: &mut dyn Canvas, image: &str) {
        let r = Rect::new(0.0, 0.0, 16.0, 16.0);
        canvas.draw_image(image, r, r, Color::WHITE);
    }

    struct Brick<'l> {
        name: &'static str,
        image: &'static str,
        depth: f32,
        y: f32,
        log: &'l Log,
    }

    impl Tile for Brick<'_> {
        fn base_depth(&self) -> f32 {
            self.depth
        }
        fn passability(&self) -> Passability {
            Passability::Solid
        }
        fn layer(&self) -> TileLayer {
            TileLayer::Default
        }
        fn is_static(&self) -> bool {
            false
        }
        fn position(&self) -> Vec2 {
            Vec2::new(0.0, self.y)
        }
        fn image_path(&self) -> &str {
            self.image
        }
        fn render(&self, _camera: Vec2, canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push(self.name);
            blit(canvas, self.image);
        }
        fn render_mask(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}
        fn render_debug(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}
        fn render_path(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}
    }

    struct Hero<'l> {
        log: &'l Log,
    }

    impl Player for Hero<'_> {
        fn is_dying(&self) -> bool {
            false
        }
        fn image_path(&self) -> &str {
            "hero.png"
        }
        fn render(&self, _camera: Vec2, canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push("player");
            blit(canvas, "hero.png");
        }
    }

    struct Theme<'l> {
        log: &'l Log,
    }

    impl LayerTheme for Theme<'_> {
        fn render_background(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push("background");
        }
        fn render_foreground(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push("foreground");
        }
    }

    struct Script<'l> {
        name: &'static str,
        depth: f32,
        alpha: Option<f32>,
        image: &'static str,
        tags: &'static [&'static str],
        log: &'l Log,
    }

    impl ScriptObject for Script<'_> {
        fn has_tag(&self, tag: &str) -> bool {
            self.tags.contains(&tag)
        }
        fn depth(&self) -> f32 {
            self.depth
        }
        fn alpha(&self) -> Option<f32> {
            self.alpha
        }
        fn image_path(&self) -> Option<&str> {
            Some(self.image)
        }
        fn render(&self, _camera: Vec2, canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push(self.name);
            blit(canvas, self.image);
        }
        fn render_gizmos(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push("gizmo");
        }
    }

    struct Sparks(usize);

    impl ParticleSystem for Sparks {
        fn is_empty(&self) -> bool {
            self.0 == 0
        }
        fn render(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {}
    }

    struct Dust<'l> {
        log: &'l Log,
    }

    impl ParticleSystem for Dust<'_> {
        fn is_empty(&self) -> bool {
            false
        }
        fn render(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push("particles");
        }
    }

    struct Lake(f32);

    impl WaterSurface for Lake {
        fn level(&self) -> f32 {
            self.0
        }
        fn color(&self) -> Color {
            Color::from_premul(0.0, 0.1, 0.3, 0.5)
        }
    }

    fn brick<'l>(name: &'static str, image: &'static str, depth: f32, y: f32, log: &'l Log) -> Brick<'l> {
        Brick { name, image, depth, y, log }
    }

    fn script<'l>(name: &'static str, depth: f32, alpha: Option<f32>, image: &'static str, log: &'l Log) -> Script<'l> {
        Script { name, depth, alpha, image, tags: &[TAG_RENDERABLE], log }
    }

    fn setup(config: QueueConfig) -> (RenderQueue, RecordingBackend) {
        let mut backend = RecordingBackend::new(SCREEN);
        let queue = RenderQueue::new(config, &mut backend);
        backend.clear();
        (queue, backend)
    }

    #[test]
    fn scenario_tiles_sort_by_y_and_batch_by_image() {
        let log = Log::default();
        let tiles = [
            brick("a5", "A", 10.0, 5.0, &log),
            brick("a1", "A", 10.0, 1.0, &log),
            brick("a3", "A", 10.0, 3.0, &log),
            brick("b0", "B", 10.0, 0.0, &log),
            brick("b0'", "B", 10.0, 0.0, &log),
        ];
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        for t in &tiles {
            assert!(frame.enqueue_tile(t));
        }
        let stats = frame.end(&mut backend);

        // Same kind and depth: vertical position decides, ties keep submission order.
        assert_eq!(*log.borrow(), vec!["b0", "b0'", "a1", "a3", "a5"]);
        assert_eq!(stats.entries, 5);
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(backend.draw_calls(), 2);

        let holds: Vec<bool> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                BackendCall::HoldDrawing(h) => Some(*h),
                _ => None,
            })
            .collect();
        assert_eq!(holds, vec![true, false, true, false]);

        // The B run is closed before the first A is drawn.
        let calls = backend.calls();
        let first_a = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DrawImage { image, .. } if image == "A"))
            .unwrap();
        assert_eq!(calls[first_a - 1], BackendCall::HoldDrawing(true));
        assert_eq!(calls[first_a - 2], BackendCall::HoldDrawing(false));
    }

    fn holds(backend: &RecordingBackend) -> Vec<bool> {
        backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                BackendCall::HoldDrawing(h) => Some(*h),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn scenario_tiles_group_by_image_with_depth_buffer() {
        let log = Log::default();
        let tiles = [
            brick("a5", "A", 10.0, 5.0, &log),
            brick("a1", "A", 10.0, 1.0, &log),
            brick("a3", "A", 10.0, 3.0, &log),
            brick("b0", "B", 10.0, 0.0, &log),
            brick("b0'", "B", 10.0, 0.0, &log),
        ];
        let config = QueueConfig { depth_buffer: true, ..QueueConfig::default() };
        let (mut queue, mut backend) = setup(config);

        let mut frame = queue.begin(CAMERA);
        for t in &tiles {
            frame.enqueue_tile(t);
        }
        let stats = frame.end(&mut backend);

        assert_eq!(*log.borrow(), vec!["a1", "a3", "a5", "b0", "b0'"]);
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(holds(&backend), vec![true, false, true, false]);

        // Depth still follows paint order: b0, b0', a1, a3, a5.
        let depths: Vec<Option<f32>> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                BackendCall::DrawImage { depth, .. } => Some(*depth),
                _ => None,
            })
            .collect();
        assert_eq!(depths, vec![Some(0.0), Some(-0.5), Some(-1.0), Some(1.0), Some(0.5)]);

        // The A run is closed before the first B is drawn.
        let calls = backend.calls();
        let last_a = calls
            .iter()
            .rposition(|c| matches!(c, BackendCall::DrawImage { image, .. } if image == "A"))
            .unwrap();
        let first_b = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DrawImage { image, .. } if image == "B"))
            .unwrap();
        assert_eq!(calls[last_a + 1], BackendCall::HoldDrawing(false));
        assert_eq!(calls[first_b - 1], BackendCall::HoldDrawing(true));
    }

    #[test]
    fn layers_at_equal_depth_keep_submission_order() {
        let log = Log::default();
        let theme = Theme { log: &log };
        let dust = Dust { log: &log };
        let lake = Lake(200.0);
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_foreground(&theme);
        frame.enqueue_particles(&dust);
        frame.enqueue_water(&lake);
        let kinds: Vec<RenderableKind> = frame.entries().map(|e| e.kind()).collect();
        frame.end(&mut backend);

        assert_eq!(
            kinds,
            vec![RenderableKind::Foreground, RenderableKind::Particles, RenderableKind::Water]
        );
        assert_eq!(*log.borrow(), vec!["foreground", "particles"]);
        let last_draw = backend
            .calls()
            .iter()
            .rev()
            .find(|c| matches!(c, BackendCall::FillRect { .. } | BackendCall::DrawImage { .. }));
        assert!(matches!(last_draw, Some(BackendCall::FillRect { .. })));
    }

    #[test]
    fn script_enqueued_before_a_tile_is_drawn_first() {
        let log = Log::default();
        let s = script("script", 0.5, None, "S", &log);
        let t = brick("tile", "T", 0.5, 0.0, &log);
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_script(&s);
        frame.enqueue_tile(&t);
        frame.end(&mut backend);

        assert_eq!(*log.borrow(), vec!["script", "tile"]);
    }

    #[test]
    fn mixed_kinds_comparing_equal_keep_enqueue_order() {
        let log = Log::default();
        let theme = Theme { log: &log };
        let dust = Dust { log: &log };
        let lake = Lake(200.0);
        let near = script("script", depth::FOREGROUND, None, "S", &log);

        let items = [
            Renderable::Foreground(&theme),
            Renderable::Particles(&dust),
            Renderable::Water(&lake),
            Renderable::ScriptObject(&near),
            Renderable::ScriptDebug(&near),
        ];
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut orders: Vec<Vec<Renderable>> = (0..items.len())
            .map(|shift| {
                let mut v = items.to_vec();
                v.rotate_left(shift);
                v
            })
            .collect();
        orders.push(items.iter().rev().copied().collect());

        for submitted in orders {
            let expected: Vec<RenderableKind> = submitted.iter().map(|r| r.kind()).collect();

            let mut frame = queue.begin(CAMERA);
            for r in &submitted {
                assert!(frame.enqueue(*r));
            }
            let kinds: Vec<RenderableKind> = frame.entries().map(|e| e.kind()).collect();
            frame.end(&mut backend);

            assert_eq!(kinds, expected);
        }
    }

    #[test]
    fn runs_ignore_translucency_without_depth_buffer() {
        let log = Log::default();
        let sprites = [
            script("solid", 0.1, None, "S", &log),
            script("faded", 0.2, Some(0.25), "S", &log),
        ];
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_script(&sprites[0]);
        frame.enqueue_script(&sprites[1]);
        let stats = frame.end(&mut backend);

        assert_eq!(*log.borrow(), vec!["solid", "faded"]);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(backend.draw_calls(), 1);
        assert_eq!(holds(&backend), vec![true, false]);
    }

    #[test]
    fn scenario_layers_wrap_the_player() {
        let log = Log::default();
        let theme = Theme { log: &log };
        let hero = Hero { log: &log };
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_foreground(&theme);
        frame.enqueue_player(&hero);
        frame.enqueue_background(&theme);
        frame.end(&mut backend);

        assert_eq!(*log.borrow(), vec!["background", "player", "foreground"]);
    }

    #[test]
    fn scenario_water_below_the_screen_is_skipped() {
        let (mut queue, mut backend) = setup(QueueConfig::default());
        let deep = Lake(CAMERA.y + SCREEN.height);

        let mut frame = queue.begin(CAMERA);
        assert!(!frame.enqueue_water(&deep));
        assert!(frame.is_empty());
        let stats = frame.end(&mut backend);

        assert_eq!(stats, FrameStats::default());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn visible_water_is_filled_last() {
        let log = Log::default();
        let lake = Lake(200.0);
        let tile = brick("t", "T", 0.5, 0.0, &log);
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        assert!(frame.enqueue_water(&lake));
        frame.enqueue_tile(&tile);
        frame.end(&mut backend);

        let last_draw = backend
            .calls()
            .iter()
            .rev()
            .find(|c| matches!(c, BackendCall::FillRect { .. } | BackendCall::DrawImage { .. }));
        assert!(matches!(last_draw, Some(BackendCall::FillRect { rect, .. }) if rect.origin.y == 200.0));
    }

    #[test]
    fn player_is_drawn_after_everything_at_its_depth() {
        let log = Log::default();
        let hero = Hero { log: &log };
        let a = brick("tile", "T", depth::MIDGROUND, 900.0, &log);
        let s = script("script", depth::MIDGROUND, None, "S", &log);
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_player(&hero);
        frame.enqueue_tile(&a);
        frame.enqueue_script(&s);
        frame.end(&mut backend);

        assert_eq!(log.borrow().last(), Some(&"player"));
    }

    #[test]
    fn admission_filters_apply() {
        let log = Log::default();
        let empty = Sparks(0);
        let busy = Sparks(12);
        let plain = script("plain", 0.5, None, "S", &log);
        let untagged = Script { tags: &[], ..script("untagged", 0.5, None, "S", &log) };
        let gizmo = Script { tags: &[TAG_GIZMO], ..script("g", 0.5, None, "S", &log) };
        let (mut queue, _backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        assert!(!frame.enqueue_particles(&empty));
        assert!(frame.enqueue_particles(&busy));
        assert!(frame.enqueue_script(&plain));
        assert!(!frame.enqueue_script(&untagged));
        assert!(!frame.enqueue_gizmo(&plain));
        assert!(frame.enqueue_gizmo(&gizmo));
        assert_eq!(frame.len(), 3);
    }

    struct Drifter<'l> {
        name: &'static str,
        depth: Cell<f32>,
        log: &'l Log,
    }

    impl ScriptObject for Drifter<'_> {
        fn has_tag(&self, tag: &str) -> bool {
            tag == TAG_RENDERABLE
        }
        fn depth(&self) -> f32 {
            self.depth.get()
        }
        fn render(&self, _camera: Vec2, _canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn entries_keep_values_cached_at_enqueue() {
        let log = Log::default();
        let near = Drifter { name: "near", depth: Cell::new(0.2), log: &log };
        let far = Drifter { name: "far", depth: Cell::new(0.4), log: &log };
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_script(&near);
        frame.enqueue_script(&far);
        near.depth.set(0.9);
        let depths: Vec<f32> = frame.entries().map(|e| e.depth().value()).collect();
        frame.end(&mut backend);

        assert_eq!(depths, vec![0.2, 0.4]);
        assert_eq!(*log.borrow(), vec!["near", "far"]);
    }

    #[test]
    fn toggles_are_balanced_and_released() {
        let log = Log::default();
        let images = ["A", "A", "B", "A", "C", "C", "C", "B"];
        let tiles: Vec<Brick> = images
            .iter()
            .enumerate()
            .map(|(i, &img)| brick("t", img, 0.5, i as f32, &log))
            .collect();
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        for t in &tiles {
            frame.enqueue_tile(t);
        }
        let stats = frame.end(&mut backend);

        let on = backend.count(|c| *c == BackendCall::HoldDrawing(true));
        let off = backend.count(|c| *c == BackendCall::HoldDrawing(false));
        assert_eq!(on, off);
        assert_eq!(on, 2);
        assert!(!backend.is_drawing_held());
        assert_eq!(stats.draw_calls, 5);
        assert_eq!(backend.draw_calls(), 5);
    }

    #[test]
    fn deferred_drawing_can_be_disabled() {
        let log = Log::default();
        let tiles = [brick("a", "A", 0.5, 0.0, &log), brick("b", "A", 0.5, 1.0, &log)];
        let config = QueueConfig { deferred_drawing: false, ..QueueConfig::default() };
        let (mut queue, mut backend) = setup(config);

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_tile(&tiles[0]);
        frame.enqueue_tile(&tiles[1]);
        let stats = frame.end(&mut backend);

        assert_eq!(backend.count(|c| matches!(c, BackendCall::HoldDrawing(_))), 0);
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.savings(), 0.0);
    }

    #[test]
    fn depth_buffer_pass_splits_opaque_and_translucent() {
        let log = Log::default();
        let sprites = [
            script("ghost", 0.3, Some(0.5), "G", &log),
            script("wall", 0.1, None, "W", &log),
            script("crate", 0.2, Some(1.0), "W", &log),
        ];
        let config = QueueConfig { depth_buffer: true, ..QueueConfig::default() };
        let mut backend = RecordingBackend::new(SCREEN);
        let mut queue = RenderQueue::new(config, &mut backend);
        assert_eq!(backend.calls(), &[BackendCall::CreateShader(ShaderDesc { alpha_test: true })]);
        backend.clear();

        let mut frame = queue.begin(CAMERA);
        for s in &sprites {
            frame.enqueue_script(s);
        }
        let stats = frame.end(&mut backend);

        assert!(stats.depth_test);
        assert_eq!(stats.draw_calls, 2);
        // Opaque front-to-back, then translucent.
        assert_eq!(*log.borrow(), vec!["crate", "wall", "ghost"]);

        let calls = backend.calls();
        assert_eq!(calls[0], BackendCall::UseShader(queue.shader()));
        assert_eq!(calls[1], BackendCall::DepthTest(DepthTest::LessEqual));
        assert_eq!(calls[2], BackendCall::WriteMask(WriteMask::ColorAndDepth));
        assert_eq!(calls[3], BackendCall::ClearDepth(1.0));

        let draws: Vec<(String, Option<f32>)> = calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::DrawImage { image, depth, .. } => Some((image.clone(), *depth)),
                _ => None,
            })
            .collect();
        // Paint order: wall (z 1), crate (z 0.5), ghost (z 0).
        assert_eq!(
            draws,
            vec![
                ("W".to_owned(), Some(0.0)),
                ("W".to_owned(), Some(1.0)),
                ("G".to_owned(), Some(-1.0)),
            ]
        );

        let mask_switch = calls
            .iter()
            .position(|c| *c == BackendCall::WriteMask(WriteMask::Color))
            .unwrap();
        let ghost = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DrawImage { image, .. } if image == "G"))
            .unwrap();
        let last_wall = calls
            .iter()
            .rposition(|c| matches!(c, BackendCall::DrawImage { image, .. } if image == "W"))
            .unwrap();
        assert!(last_wall < mask_switch && mask_switch < ghost);

        let tail = &calls[calls.len() - 4..];
        assert_eq!(
            tail,
            &[
                BackendCall::DepthOffset(None),
                BackendCall::DepthTest(DepthTest::Disabled),
                BackendCall::WriteMask(WriteMask::ColorAndDepth),
                BackendCall::UseShader(None),
            ]
        );
    }

    #[test]
    fn runs_do_not_cross_the_translucent_split() {
        let log = Log::default();
        let sprites = [
            script("solid", 0.1, None, "S", &log),
            script("faded", 0.2, Some(0.25), "S", &log),
        ];
        let config = QueueConfig { depth_buffer: true, ..QueueConfig::default() };
        let (mut queue, mut backend) = setup(config);

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_script(&sprites[0]);
        frame.enqueue_script(&sprites[1]);
        let stats = frame.end(&mut backend);

        assert_eq!(stats.draw_calls, 2);
        assert_eq!(backend.count(|c| matches!(c, BackendCall::HoldDrawing(_))), 0);
    }

    #[test]
    fn shader_failure_falls_back_once() {
        let log = Log::default();
        let tile = brick("t", "T", 0.5, 0.0, &log);
        let mut backend = RecordingBackend::new(SCREEN).failing_shaders();
        let mut queue = RenderQueue::new(QueueConfig::default(), &mut backend);
        assert_eq!(queue.shader(), None);

        for _ in 0..3 {
            let mut frame = queue.begin(CAMERA);
            frame.enqueue_tile(&tile);
            frame.end(&mut backend);
        }

        assert_eq!(backend.count(|c| matches!(c, BackendCall::CreateShader(_))), 1);
        assert_eq!(backend.count(|c| *c == BackendCall::UseShader(None)), 6);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn capacity_grows_and_is_kept() {
        let log = Log::default();
        let tiles: Vec<Brick> = (0..5).map(|i| brick("t", "T", 0.5, i as f32, &log)).collect();
        let config = QueueConfig { initial_capacity: 2, ..QueueConfig::default() };
        let (mut queue, mut backend) = setup(config);

        let mut frame = queue.begin(CAMERA);
        for t in &tiles {
            frame.enqueue_tile(t);
        }
        assert_eq!(frame.len(), 5);
        frame.end(&mut backend);

        assert!(queue.capacity() >= 5);
        assert_eq!(queue.last_stats().entries, 5);

        let frame = queue.begin(CAMERA);
        assert!(frame.is_empty());
        frame.end(&mut backend);
        assert_eq!(queue.last_stats(), FrameStats::default());
    }

    #[test]
    fn dropped_frame_is_discarded() {
        let log = Log::default();
        let tile = brick("t", "T", 0.5, 0.0, &log);
        let (mut queue, backend) = setup(QueueConfig::default());

        {
            let mut frame = queue.begin(CAMERA);
            frame.enqueue_tile(&tile);
        }

        assert!(backend.calls().is_empty());
        assert!(log.borrow().is_empty());
        assert!(queue.begin(CAMERA).is_empty());
    }

    #[test]
    fn non_finite_depth_is_sanitized_and_reported_once() {
        let log = Log::default();
        let broken = script("nan", f32::NAN, None, "S", &log);
        let front = script("inf", f32::INFINITY, None, "S", &log);
        let back = script("back", 0.1, None, "S", &log);
        let (mut queue, mut backend) = setup(QueueConfig::default());

        let mut frame = queue.begin(CAMERA);
        frame.enqueue_script(&front);
        frame.enqueue_script(&broken);
        frame.enqueue_script(&back);
        let depths: Vec<f32> = frame.entries().map(|e| e.depth().value()).collect();
        frame.end(&mut backend);

        assert_eq!(depths, vec![0.1, depth::MIDGROUND, f32::MAX]);
        assert_eq!(*log.borrow(), vec!["back", "nan", "inf"]);
        assert!(queue.warned_non_finite);
    }
}
