//! Color model shared by collaborators and the sprite backend.
//!
//! All colors handed to a [`Canvas`](crate::render::Canvas) are linear
//! premultiplied RGBA. Geometry types remain in `coords`.

mod color;

pub use color::Color;
