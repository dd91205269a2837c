use crate::context::ProcessContext;
use crate::device::WgpuBackend;
use crate::registry::WindowId;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-frame context passed to `App::on_start` and `App::on_frame`.
pub struct FrameCtx<'a> {
    /// Command producers and shared engine state.
    pub engine: &'a ProcessContext<WgpuBackend>,
    /// Window lifecycle and exit requests, applied after the callback.
    pub runtime: &'a mut RuntimeCtx,
    /// Windows currently open, in creation order.
    pub windows: &'a [WindowId],
    pub time: FrameTime,
}
