use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Implemented by the game.
pub trait App {
    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
