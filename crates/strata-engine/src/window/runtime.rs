use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::Window;

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub min_size: Option<LogicalSize<f64>>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "strata".to_string(),
            // Three times the 426x240 game screen.
            initial_size: LogicalSize::new(1278.0, 720.0),
            min_size: Some(LogicalSize::new(426.0, 240.0)),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    SetTitle(String),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and runs `app` until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            app,
            window: None,
            exit_requested: false,
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    exit_requested: bool,
    /// First fatal error, returned from `Runtime::run`.
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        if let Some(min) = self.config.min_size {
            attrs = attrs.with_min_inner_size(min);
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for cmd in ctx.commands {
            match cmd {
                Command::SetTitle(title) => {
                    if let Some(entry) = &self.window {
                        entry.with_window(|w| w.set_title(&title));
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else { return };

        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                time,
                runtime: &mut runtime_ctx,
            };
            control = app.on_frame(&mut ctx);
        });

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_commands(event_loop, runtime_ctx);
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.create_window_entry(event_loop) {
            self.fail(event_loop, err.context("failed to open the game window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Games redraw continuously; FIFO presentation paces the loop.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::Occluded(false) | WindowEvent::Focused(true) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_clock_mut(|clock| clock.reset());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
