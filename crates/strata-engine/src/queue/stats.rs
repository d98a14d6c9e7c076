use core::fmt;

/// What the last frame submitted.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub entries: usize,
    pub draw_calls: usize,
    pub depth_test: bool,
}

impl FrameStats {
    /// Fraction of draw calls saved by batching, in `[0, 1)`.
    pub fn savings(&self) -> f32 {
        if self.entries == 0 {
            return 0.0;
        }
        1.0 - self.draw_calls as f32 / self.entries as f32
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} draw calls ({:.1}% saved), depth test {}",
            self.entries,
            self.draw_calls,
            self.savings() * 100.0,
            if self.depth_test { "on" } else { "off" },
        )
    }
}
