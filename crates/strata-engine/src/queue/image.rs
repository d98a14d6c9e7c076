use core::fmt;

use super::RenderableKind;

/// Source-image identity of a queued entry.
///
/// Entries sharing a [`ImageKey::Path`] can be drawn in one batch. Synthetic
/// identities carry the entry's serial, so they never match a real path nor
/// another entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ImageKey<'a> {
    Path(&'a str),
    Synthetic { kind: RenderableKind, serial: u32 },
}

impl<'a> ImageKey<'a> {
    /// Uses `path` when the entity exposes one, or a synthetic identity.
    #[inline]
    pub fn path_or_synthetic(path: Option<&'a str>, kind: RenderableKind, serial: u32) -> Self {
        match path {
            Some(p) => ImageKey::Path(p),
            None => ImageKey::Synthetic { kind, serial },
        }
    }

    #[inline]
    pub fn path(self) -> Option<&'a str> {
        match self {
            ImageKey::Path(p) => Some(p),
            ImageKey::Synthetic { .. } => None,
        }
    }

    #[inline]
    pub fn is_synthetic(self) -> bool {
        matches!(self, ImageKey::Synthetic { .. })
    }
}

impl fmt::Display for ImageKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKey::Path(p) => f.write_str(p),
            ImageKey::Synthetic { kind, serial } => write!(f, "<{kind}:{serial}>"),
        }
    }
}
