//! Render thread.
//!
//! Per tick, on the render thread only:
//! 1) drain resource, scene and window commands (in that order)
//! 2) acquire / encode / present one frame per window
//!
//! `RenderBackend` is the seam to the graphics API; `RenderState` holds the
//! registries and backend the executors mutate.

mod backend;
mod frame_loop;
mod state;
mod thread;

pub use backend::{Acquired, BackendError, RenderBackend, ResolvedDraw, SceneFrame};
pub use frame_loop::{FrameStats, RenderLoop};
pub use state::{PassStats, RenderState};
pub use thread::RenderThread;
