//! Per-frame render queue.
//!
//! Responsibilities:
//! - collect heterogeneous renderables from unrelated subsystems
//! - keep them in back-to-front paint order as they arrive
//! - submit them with as few backend draw calls as the order allows
//!
//! Paint order is ascending depth (smaller keys are farther back). At equal
//! depth the player is drawn last, kinds with a vertical position are kept
//! apart by a fixed rank and layered by that position, and everything else
//! keeps submission order.

mod batch;
mod config;
mod frame;
mod image;
mod key;
mod kind;
mod partition;
mod renderable;
mod stats;
mod store;

pub mod depth;
pub mod source;

pub use config::QueueConfig;
pub use depth::{DepthKey, Passability, TileLayer};
pub use frame::{Frame, RenderQueue};
pub use image::ImageKey;
pub use key::SortKey;
pub use kind::RenderableKind;
pub use renderable::Renderable;
pub use stats::FrameStats;
pub use store::{Entry, EntryStore};
