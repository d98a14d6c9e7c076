//! Instanced sprite renderer implementing [`crate::render::Backend`] on wgpu.

mod batcher;
mod pipeline;
mod textures;

pub use batcher::SpriteBatcher;
