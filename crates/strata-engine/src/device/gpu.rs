use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// FIFO (vsync) is supported everywhere and keeps the game at display rate.
    pub present_mode: wgpu::PresentMode,

    /// Used when supported by the surface; otherwise the first supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Depth attachment format for renderers that use a depth buffer.
    pub depth_format: wgpu::TextureFormat,

    /// Hint; support depends on platform and backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Owns wgpu core objects and the surface configuration.
///
/// The surface borrows the window for `'w`; the window must outlive the `Gpu`.
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_format: wgpu::TextureFormat,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

/// One acquired surface texture plus its encoder.
///
/// Holding it blocks acquisition of the next frame; submit promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Size of the surface texture in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let t = &self.surface_texture.texture;
        (t.width(), t.height())
    }
}

/// What to do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("strata device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = init
            .alpha_mode
            .filter(|m| caps.alpha_modes.contains(m))
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) = surface_extent(size);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        Ok(Gpu {
            surface,
            device,
            queue,
            config,
            depth_format: init.depth_format,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the surface after a resize.
    ///
    /// A 0x0 size (minimized window) is recorded but not applied.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("strata frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the frame's commands and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        let action = surface_error_action(&err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
        log::debug!("surface error {err:?}: {action:?}");
        action
    }
}

/// Surface dimensions for a window size; wgpu rejects zero extents.
fn surface_extent(size: PhysicalSize<u32>) -> (u32, u32) {
    (size.width.max(1), size.height.max(1))
}

fn surface_error_action(err: &SurfaceError) -> SurfaceErrorAction {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        SurfaceError::Timeout | SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = formats.first().copied()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}
