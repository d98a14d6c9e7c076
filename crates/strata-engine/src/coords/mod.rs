//! Coordinate and geometry types shared by the queue, its collaborators and
//! the sprite backend.
//!
//! Two spaces are in use:
//! - world space: level coordinates, +Y down; the camera is a world position
//!   at the center of the screen
//! - screen space: logical pixels, origin top-left, +X right, +Y down
//!
//! [`Viewport::world_to_screen`] converts between them.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
