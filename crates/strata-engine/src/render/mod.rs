//! Drawing backends.
//!
//! The render queue talks to a [`Backend`]; renderables draw on a [`Canvas`].
//! [`SpriteBatcher`] is the wgpu implementation, [`RecordingBackend`] records
//! calls for inspection.
//!
//! Convention:
//! - geometry is in logical screen pixels (top-left origin, +Y down)
//! - the vertex shader converts to NDC using a viewport uniform

mod backend;
mod ctx;
mod recording;
mod sprite;

pub use backend::{Backend, Canvas, DepthTest, ShaderDesc, ShaderId, WriteMask};
pub use ctx::{RenderCtx, RenderTarget};
pub use recording::{BackendCall, RecordingBackend};
pub use sprite::SpriteBatcher;
