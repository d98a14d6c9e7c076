//! Side-scrolling demo for the strata render queue.
//!
//! F1 toggles editor overlays, F2 toggles the depth-buffer path, Esc quits.
//! Pass `--depth-buffer` to start with the depth buffer enabled.

mod level;
mod sprites;

use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use strata_engine::core::{App, AppControl, FrameCtx};
use strata_engine::device::GpuInit;
use strata_engine::logging::{init_logging, LoggingConfig};
use strata_engine::paint::Color;
use strata_engine::queue::{FrameStats, QueueConfig, RenderQueue};
use strata_engine::render::{RenderCtx, SpriteBatcher};
use strata_engine::window::{Runtime, RuntimeConfig};

use level::Level;

const SKY: Color = Color::from_premul(0.35, 0.55, 0.85, 1.0);

/// GPU-side state, created on the first frame once a device exists.
struct Renderer {
    batcher: SpriteBatcher,
    queue: RenderQueue,
}

impl Renderer {
    fn new(ctx: &RenderCtx<'_>, depth_format: wgpu::TextureFormat, config: QueueConfig) -> Result<Self> {
        let mut batcher = SpriteBatcher::new(ctx, config.screen_size, depth_format);
        sprites::register_all(&mut batcher)?;
        let queue = RenderQueue::new(config, &mut batcher);
        Ok(Self { batcher, queue })
    }
}

struct Demo {
    level: Level,
    config: QueueConfig,
    renderer: Option<Renderer>,
    show_debug: bool,
    rebuild_queue: bool,
    title_timer: f32,
}

impl Demo {
    fn new(config: QueueConfig) -> Self {
        Self {
            level: Level::new(),
            config,
            renderer: None,
            show_debug: false,
            rebuild_queue: false,
            title_timer: 0.0,
        }
    }
}

impl App for Demo {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => return AppControl::Exit,
            PhysicalKey::Code(KeyCode::F1) => {
                self.show_debug = !self.show_debug;
                log::info!("editor overlays {}", if self.show_debug { "on" } else { "off" });
            }
            PhysicalKey::Code(KeyCode::F2) => {
                self.config.depth_buffer = !self.config.depth_buffer;
                self.rebuild_queue = true;
                log::info!("depth buffer {}", if self.config.depth_buffer { "on" } else { "off" });
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let dt = ctx.time.dt;
        self.level.update(dt);

        let screen = self.config.screen_size;
        let camera = self.level.camera(screen);
        let depth_format = ctx.gpu.depth_format();

        let mut stats: Option<FrameStats> = None;
        let mut init_error = None;

        let control = {
            let Demo {
                level,
                config,
                renderer,
                show_debug,
                rebuild_queue,
                ..
            } = self;

            ctx.render(SKY, |rctx, target| {
                if renderer.is_none() {
                    match Renderer::new(rctx, depth_format, config.clone()) {
                        Ok(r) => *renderer = Some(r),
                        Err(err) => {
                            init_error = Some(err);
                            return;
                        }
                    }
                }
                let Some(r) = renderer.as_mut() else { return };

                if std::mem::take(rebuild_queue) {
                    r.queue = RenderQueue::new(config.clone(), &mut r.batcher);
                }

                let mut frame = r.queue.begin(camera);
                level.enqueue(&mut frame, screen, *show_debug);
                stats = Some(frame.end(&mut r.batcher));

                r.batcher.finish(rctx, target);
            })
        };

        if let Some(err) = init_error {
            log::error!("renderer setup failed: {err:#}");
            return AppControl::Exit;
        }

        self.title_timer += dt;
        if self.title_timer >= 1.0 {
            self.title_timer = 0.0;
            if let Some(stats) = stats {
                let gpu_calls = self
                    .renderer
                    .as_ref()
                    .map_or(0, |r| r.batcher.last_draw_calls());
                ctx.runtime
                    .set_title(format!("strata | {stats} | {gpu_calls} gpu draws"));
            }
        }

        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = QueueConfig {
        depth_buffer: std::env::args().any(|a| a == "--depth-buffer"),
        ..QueueConfig::default()
    };

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), Demo::new(config))
}
