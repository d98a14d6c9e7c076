use crate::coords::Viewport;

/// Render queue parameters.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Entries preallocated before the first frame. The queue doubles on
    /// overflow and keeps the high-water mark for later frames.
    pub initial_capacity: usize,

    /// Merge consecutive draws of the same image through the backend's
    /// deferred drawing mode.
    pub deferred_drawing: bool,

    /// Resolve overlap with the depth buffer instead of painter's order
    /// alone, which lets the queue regroup entries by image.
    ///
    /// Only honored together with `deferred_drawing`.
    pub depth_buffer: bool,

    /// Log per-frame statistics at debug level and batches at trace level.
    pub report_stats: bool,

    /// Screen size used by admission filters (the water line).
    pub screen_size: Viewport,
}

impl QueueConfig {
    #[inline]
    pub fn uses_depth_buffer(&self) -> bool {
        self.depth_buffer && self.deferred_drawing
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            deferred_drawing: true,
            depth_buffer: false,
            report_stats: false,
            screen_size: Viewport::new(426.0, 240.0),
        }
    }
}
