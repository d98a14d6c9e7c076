use crate::coords::Viewport;

/// Renderer-facing context (device/queue + surface format + viewport).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Window size in logical pixels.
    pub viewport: Viewport,
    pub scale_factor: f32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        scale_factor: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
            scale_factor,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    /// Size of `color_view` in physical pixels.
    pub size: (u32, u32),
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        size: (u32, u32),
    ) -> Self {
        Self { encoder, color_view, size }
    }
}
