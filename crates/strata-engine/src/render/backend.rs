use crate::coords::{Rect, Viewport};
use crate::paint::Color;

/// Drawing surface handed to renderables.
///
/// Coordinates are screen-space logical pixels. Collaborators convert from
/// world space with the camera they receive alongside the canvas.
pub trait Canvas {
    /// Size of the screen being drawn to.
    fn screen_size(&self) -> Viewport;

    /// Draws the `src` pixel region of a registered image into `dst`.
    ///
    /// `image` is the same path the renderable reports as its source image,
    /// which is what lets consecutive draws share a batch.
    fn draw_image(&mut self, image: &str, src: Rect, dst: Rect, tint: Color);

    /// Fills a rectangle with a premultiplied color.
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

/// Handle to a shader created by a [`Backend`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub u32);

/// Shader variant requested by the render queue.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ShaderDesc {
    /// Discard fully transparent texels so they never write depth.
    pub alpha_test: bool,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DepthTest {
    #[default]
    Disabled,
    LessEqual,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum WriteMask {
    /// Color only; the draw never occludes later draws.
    Color,
    #[default]
    ColorAndDepth,
}

/// Graphics backend driven by the render queue.
///
/// Besides drawing, the queue needs control over deferred drawing, the
/// shader, and the depth state. Depth offsets are clip-space z in `[-1, 1]`
/// (`-1` nearest); `None` restores the identity transform.
pub trait Backend: Canvas {
    /// Enables or disables deferred drawing.
    ///
    /// While held, consecutive draws of the same image may be merged; nothing
    /// is guaranteed to land until the hold is released.
    fn hold_drawing(&mut self, hold: bool);

    fn is_drawing_held(&self) -> bool;

    /// Creates a shader. Called once per queue, never per frame.
    fn create_shader(&mut self, desc: ShaderDesc) -> anyhow::Result<ShaderId>;

    /// Binds a shader, or the backend default when `None`.
    fn use_shader(&mut self, shader: Option<ShaderId>);

    fn set_depth_test(&mut self, test: DepthTest);

    fn set_write_mask(&mut self, mask: WriteMask);

    fn clear_depth(&mut self, value: f32);

    fn set_depth_offset(&mut self, z: Option<f32>);
}
