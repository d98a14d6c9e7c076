/// Run-length encodes consecutive equal images, right to left.
///
/// `runs[i]` is the number of entries from `i` to the end of its run, so
/// `runs[i] == 1` marks the last entry of a run. `same(i, i + 1)` reports
/// whether two neighbours in submission order share a source image.
pub fn encode_runs(len: usize, runs: &mut Vec<u32>, mut same: impl FnMut(usize, usize) -> bool) {
    runs.clear();
    runs.resize(len, 1);

    for i in (0..len.saturating_sub(1)).rev() {
        if same(i, i + 1) {
            runs[i] = runs[i + 1] + 1;
        }
    }
}

/// Batch boundaries over an encoded run array.
///
/// Position `-1` wraps around to the last entry, whose run value is always 1.
#[derive(Debug, Copy, Clone)]
pub struct Batches<'r> {
    runs: &'r [u32],
}

impl<'r> Batches<'r> {
    #[inline]
    pub fn new(runs: &'r [u32]) -> Self {
        Self { runs }
    }

    #[inline]
    fn prev(&self, i: usize) -> u32 {
        let n = self.runs.len();
        self.runs[(i + n - 1) % n]
    }

    /// Deferred drawing starts before drawing entry `i`.
    #[inline]
    pub fn opens(&self, i: usize) -> bool {
        self.runs[i] > self.prev(i)
    }

    /// Deferred drawing stops after drawing entry `i`.
    #[inline]
    pub fn closes(&self, i: usize) -> bool {
        self.runs[i] == 1
    }

    /// Entry `i` starts a new backend draw call.
    #[inline]
    pub fn starts_draw_call(&self, i: usize) -> bool {
        self.runs[i] >= self.prev(i)
    }

    pub fn draw_calls(&self) -> usize {
        (0..self.runs.len()).filter(|&i| self.starts_draw_call(i)).count()
    }
}
