use super::{DepthKey, ImageKey, Renderable, RenderableKind, SortKey};

/// A queued renderable with its cached paint attributes.
///
/// Everything is computed once at enqueue time; later changes to the
/// underlying object do not move the entry within the frame.
#[derive(Debug, Copy, Clone)]
pub struct Entry<'a> {
    renderable: Renderable<'a>,
    kind: RenderableKind,
    depth: DepthKey,
    ypos: i32,
    translucent: bool,
    image: ImageKey<'a>,
    key: SortKey,
}

impl<'a> Entry<'a> {
    /// Builds an entry. The flag reports whether the depth had to be sanitized.
    pub fn new(renderable: Renderable<'a>, serial: u32) -> (Self, bool) {
        let kind = renderable.kind();
        let (depth, replaced) = DepthKey::sanitize(renderable.depth());
        let ypos = if kind.uses_vertical_position() {
            renderable.vertical_position()
        } else {
            0
        };

        let entry = Self {
            renderable,
            kind,
            depth,
            ypos,
            translucent: renderable.is_translucent(),
            image: renderable.image(serial),
            key: SortKey::new(depth, kind, ypos),
        };

        (entry, replaced)
    }

    #[inline]
    pub fn renderable(&self) -> Renderable<'a> {
        self.renderable
    }

    #[inline]
    pub fn kind(&self) -> RenderableKind {
        self.kind
    }

    #[inline]
    pub fn depth(&self) -> DepthKey {
        self.depth
    }

    #[inline]
    pub fn ypos(&self) -> i32 {
        self.ypos
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    #[inline]
    pub fn image(&self) -> ImageKey<'a> {
        self.image
    }

    #[inline]
    pub fn key(&self) -> SortKey {
        self.key
    }
}

/// Entries of one frame plus their paint order.
///
/// Performance characteristics:
/// - `push()` is amortized O(1) plus the insertion shift, which is short
///   because producers mostly submit in near-paint order
/// - `sorted` always holds a permutation of `0..len` in paint order
#[derive(Debug)]
pub struct EntryStore<'a> {
    entries: Vec<Entry<'a>>,
    sorted: Vec<u32>,
}

impl<'a> EntryStore<'a> {
    /// `sorted` is a recycled index buffer; its contents are discarded.
    pub fn with_capacity(capacity: usize, mut sorted: Vec<u32>) -> Self {
        let capacity = capacity.max(1);
        sorted.clear();
        sorted.reserve_exact(capacity);

        Self {
            entries: Vec::with_capacity(capacity),
            sorted,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Appends an entry and inserts it into paint order.
    ///
    /// Equal keys keep submission order. Returns the entry index.
    pub fn push(&mut self, entry: Entry<'a>) -> u32 {
        if self.entries.len() == self.entries.capacity() {
            self.grow();
        }

        let index = self.entries.len() as u32;
        let key = entry.key;
        self.entries.push(entry);
        self.sorted.push(index);

        let mut slot = self.sorted.len() - 1;
        while slot > 0 && key < self.entries[self.sorted[slot - 1] as usize].key {
            self.sorted[slot] = self.sorted[slot - 1];
            slot -= 1;
        }
        self.sorted[slot] = index;

        index
    }

    /// Doubles both arrays together. Allocation failure aborts.
    fn grow(&mut self) {
        let len = self.entries.len();
        let target = (len * 2).max(1);
        self.entries.reserve_exact(target - len);
        self.sorted.reserve_exact(target - self.sorted.len());

        log::debug!("render queue grown to {} entries", self.entries.capacity());
    }

    #[inline]
    pub fn entry(&self, index: u32) -> &Entry<'a> {
        &self.entries[index as usize]
    }

    /// Entry indices in paint order.
    #[inline]
    pub fn sorted(&self) -> &[u32] {
        &self.sorted
    }

    pub fn iter_sorted(&self) -> impl Iterator<Item = &Entry<'a>> {
        self.sorted.iter().map(|&i| &self.entries[i as usize])
    }

    /// Hands the index buffer back for reuse by the next frame.
    pub fn take_sorted_buffer(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.sorted)
    }
}
