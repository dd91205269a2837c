use thiserror::Error;

use crate::registry::{CameraId, SceneId, WindowId};
use crate::resource::{MeshDesc, TextureDesc};
use crate::scene::Camera;
use crate::window::Extent;

/// Errors raised by a `RenderBackend`.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },

    #[error("cannot create surface for {window}: {reason}")]
    Surface { window: WindowId, reason: String },

    /// Device lost or out of memory. Ends the render loop.
    #[error("fatal device error: {0}")]
    Fatal(String),
}

impl BackendError {
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        BackendError::Invalid {
            what,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, BackendError::Fatal(_))
    }
}

/// Result of trying to acquire a frame from a surface.
#[derive(Debug)]
pub enum Acquired<F> {
    Frame(F),
    /// Transient failure or zero-sized surface; nothing to draw this tick.
    Skipped,
    /// Surface was outdated or lost and has been reconfigured.
    Reconfigured,
}

/// One draw whose handles resolved to live, populated resources.
pub struct ResolvedDraw<'a, B: RenderBackend> {
    pub mesh: &'a B::Mesh,
    pub texture: Option<&'a B::Texture>,
    pub transform: [[f32; 4]; 4],
}

/// Everything a backend needs to encode one window's frame.
///
/// Borrowed from render-thread state and from resources resolved before the
/// store lock was released; lives only for the duration of
/// `RenderBackend::encode_frame`.
pub struct SceneFrame<'a, B: RenderBackend> {
    pub window: WindowId,
    pub size: Extent,
    pub scene: Option<SceneId>,
    pub camera: Option<(CameraId, &'a Camera)>,
    pub clear_color: [f32; 4],
    pub draws: &'a [ResolvedDraw<'a, B>],
}

/// Graphics-API seam of the render thread.
///
/// All methods run on the render thread. Resource types must be `Send` and
/// `Sync` because they live behind `Arc`s in the resource store, which the
/// main thread locks to reserve and validate handles.
pub trait RenderBackend: Sized + 'static {
    type Texture: Send + Sync + 'static;
    type Mesh: Send + Sync + 'static;
    type Surface;
    type Frame;

    /// Whatever the windowing layer hands over to build a surface
    /// (e.g. a shared window handle).
    type WindowTarget: Send + 'static;

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<Self::Texture, BackendError>;

    fn create_mesh(
        &mut self,
        desc: &MeshDesc,
        vertices: &[u8],
        indices: &[u32],
    ) -> Result<Self::Mesh, BackendError>;

    fn create_surface(
        &mut self,
        window: WindowId,
        target: Self::WindowTarget,
        size: Extent,
    ) -> Result<Self::Surface, BackendError>;

    /// Applies a new drawable size. Zero sizes are recorded but not configured.
    fn resize_surface(&mut self, surface: &mut Self::Surface, size: Extent);

    /// Reconfigures the surface with its current size.
    fn reconfigure_surface(&mut self, surface: &mut Self::Surface);

    /// Acquires the next frame. May block on presentation; no locks are held.
    fn acquire_frame(&mut self, surface: &mut Self::Surface) -> Result<Acquired<Self::Frame>, BackendError>;

    /// Records the frame's GPU work. No locks are held.
    fn encode_frame(&mut self, frame: &mut Self::Frame, scene: &SceneFrame<'_, Self>);

    /// Submits and presents.
    fn present_frame(&mut self, surface: &mut Self::Surface, frame: Self::Frame);
}
