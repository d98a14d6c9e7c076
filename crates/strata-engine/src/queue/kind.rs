use core::fmt;

/// Closed set of things the render queue can draw.
///
/// See [`RenderableKind::rank`] for how kinds break depth ties.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RenderableKind {
    Background,
    Tile,
    TileDebug,
    TileMask,
    TilePath,
    LegacyItem,
    LegacyObject,
    ScriptObject,
    ScriptDebug,
    ScriptGizmo,
    Particles,
    Water,
    Foreground,
    Player,
}

impl RenderableKind {
    pub const ALL: [RenderableKind; 14] = [
        RenderableKind::Background,
        RenderableKind::Tile,
        RenderableKind::TileDebug,
        RenderableKind::TileMask,
        RenderableKind::TilePath,
        RenderableKind::LegacyItem,
        RenderableKind::LegacyObject,
        RenderableKind::ScriptObject,
        RenderableKind::ScriptDebug,
        RenderableKind::ScriptGizmo,
        RenderableKind::Particles,
        RenderableKind::Water,
        RenderableKind::Foreground,
        RenderableKind::Player,
    ];

    /// Tie-break class between different kinds at equal depth.
    ///
    /// Kinds without a vertical position share class 0 and keep submission
    /// order among themselves. Positioned kinds get one class each so their
    /// vertical positions are only compared within a kind. The player ranks
    /// last.
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            RenderableKind::Background
            | RenderableKind::ScriptObject
            | RenderableKind::ScriptDebug
            | RenderableKind::ScriptGizmo
            | RenderableKind::Particles
            | RenderableKind::Water
            | RenderableKind::Foreground => 0,
            RenderableKind::Tile => 1,
            RenderableKind::TileDebug => 2,
            RenderableKind::TileMask => 3,
            RenderableKind::TilePath => 4,
            RenderableKind::LegacyItem => 5,
            RenderableKind::LegacyObject => 6,
            RenderableKind::Player => 7,
        }
    }

    #[inline]
    pub fn is_player(self) -> bool {
        matches!(self, RenderableKind::Player)
    }

    /// Kinds whose vertical position is taken from the entity.
    #[inline]
    pub fn uses_vertical_position(self) -> bool {
        matches!(
            self,
            RenderableKind::Tile
                | RenderableKind::TileDebug
                | RenderableKind::TileMask
                | RenderableKind::TilePath
                | RenderableKind::LegacyItem
                | RenderableKind::LegacyObject
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderableKind::Background => "background",
            RenderableKind::Tile => "tile",
            RenderableKind::TileDebug => "tile-debug",
            RenderableKind::TileMask => "tile-mask",
            RenderableKind::TilePath => "tile-path",
            RenderableKind::LegacyItem => "item",
            RenderableKind::LegacyObject => "object",
            RenderableKind::ScriptObject => "script",
            RenderableKind::ScriptDebug => "script-debug",
            RenderableKind::ScriptGizmo => "gizmo",
            RenderableKind::Particles => "particles",
            RenderableKind::Water => "water",
            RenderableKind::Foreground => "foreground",
            RenderableKind::Player => "player",
        }
    }
}

impl fmt::Display for RenderableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
