//! Contract between the runtime loop and the game.
//!
//! The runtime owns the window and GPU; a game implements [`App`] and draws
//! through the [`FrameCtx`] it receives each frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
