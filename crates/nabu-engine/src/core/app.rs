use winit::event::WindowEvent;

use crate::context::ProcessContext;
use crate::device::WgpuBackend;
use crate::registry::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract, driven on the main thread.
///
/// Callbacks never touch GPU objects. They record commands through
/// `FrameCtx::engine`; the render thread applies them on its next tick.
pub trait App {
    /// Called once, after the initial window was handed to the render thread.
    fn on_start(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    fn on_window_event(&mut self, window: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window, event);
        AppControl::Continue
    }

    /// Called once per main-thread frame, after load callbacks have run.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called after the event loop ended, before the render thread is joined.
    fn on_exit(&mut self, engine: &ProcessContext<WgpuBackend>) {
        let _ = engine;
    }
}
