use thiserror::Error;

use crate::render::BackendError;

/// Why the render thread could not start or did not stop cleanly.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("render backend initialization failed: {0}")]
    BackendInit(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("render thread panicked")]
    RenderThreadPanicked,
}
