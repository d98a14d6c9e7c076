//! Strata engine crate.
//!
//! A per-frame render queue for 2D platformers plus the winit/wgpu runtime
//! and sprite backend that drive it.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod queue;
