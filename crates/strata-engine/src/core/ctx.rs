use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` is the callback borrow, `'w` the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Window size in logical pixels.
    pub fn logical_size(&self) -> Viewport {
        let logical: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        Viewport::new(logical.width as f32, logical.height as f32)
    }

    /// Clears the surface with `clear`, hands `draw` a [`RenderCtx`] and
    /// [`RenderTarget`], then presents.
    ///
    /// Surface errors skip the frame; a fatal one returns `Exit`.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let viewport = self.logical_size();
        let scale_factor = self.window.scale_factor() as f32;

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        {
            let [r, g, b, a] = clear.to_array();
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("strata clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            viewport,
            scale_factor,
        );

        // The target borrows the encoder; it must be gone before submit.
        {
            let size = frame.size();
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, size);
            draw(&rctx, &mut target);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
