use core::fmt;

use thiserror::Error;

use crate::command::Apply;
use crate::handle::{HandleError, MeshHandle, TextureHandle};
use crate::render::{BackendError, RenderBackend, RenderState};

use super::{MeshDesc, TextureDesc};

/// Why a queued upload did not produce a ready resource.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("upload failed: {0}")]
    Backend(#[from] BackendError),

    #[error("slot released before upload: {0}")]
    Released(#[from] HandleError),
}

/// Load-completion callback, run on the main thread.
pub type Completion<H> = Box<dyn FnOnce(Result<H, LoadError>) + Send + 'static>;

/// Resource lifecycle record.
///
/// Payloads are private copies made at enqueue time; the executor drops
/// them once the upload has been issued.
pub enum ResourceCmd {
    CreateTexture {
        handle: TextureHandle,
        desc: TextureDesc,
        pixels: Vec<u8>,
        on_ready: Option<Completion<TextureHandle>>,
    },
    CreateMesh {
        handle: MeshHandle,
        desc: MeshDesc,
        vertices: Vec<u8>,
        indices: Vec<u32>,
        on_ready: Option<Completion<MeshHandle>>,
    },
    DestroyTexture(TextureHandle),
    DestroyMesh(MeshHandle),
}

impl fmt::Debug for ResourceCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceCmd::CreateTexture { handle, desc, pixels, on_ready } => f
                .debug_struct("CreateTexture")
                .field("handle", handle)
                .field("desc", desc)
                .field("bytes", &pixels.len())
                .field("callback", &on_ready.is_some())
                .finish(),
            ResourceCmd::CreateMesh { handle, desc, vertices, indices, on_ready } => f
                .debug_struct("CreateMesh")
                .field("handle", handle)
                .field("desc", desc)
                .field("vertex_bytes", &vertices.len())
                .field("indices", &indices.len())
                .field("callback", &on_ready.is_some())
                .finish(),
            ResourceCmd::DestroyTexture(h) => f.debug_tuple("DestroyTexture").field(h).finish(),
            ResourceCmd::DestroyMesh(h) => f.debug_tuple("DestroyMesh").field(h).finish(),
        }
    }
}

impl<B: RenderBackend> Apply<RenderState<B>> for ResourceCmd {
    fn apply(self, target: &mut RenderState<B>) {
        match self {
            ResourceCmd::CreateTexture { handle, desc, pixels, on_ready } => {
                // Upload runs without the store lock; only the slot write takes it.
                let uploaded = target.backend.create_texture(&desc, &pixels);
                drop(pixels);

                let outcome = match uploaded {
                    Ok(texture) => target
                        .context()
                        .lock_resources()
                        .populate_texture(handle, texture)
                        .map(|()| handle)
                        .map_err(LoadError::from),
                    Err(e) => {
                        // A failed upload frees its slot; the handle is stale from here on.
                        let _ = target.context().lock_resources().destroy_texture(handle);
                        Err(LoadError::from(e))
                    }
                };

                match &outcome {
                    Ok(_) => log::debug!("texture {handle} ({}): ready", desc.label),
                    Err(e) => log::warn!("texture {handle} ({}): {e}", desc.label),
                }

                if let Some(on_ready) = on_ready {
                    target.context().main_queue().post(move || on_ready(outcome));
                }
            }

            ResourceCmd::CreateMesh { handle, desc, vertices, indices, on_ready } => {
                let uploaded = target.backend.create_mesh(&desc, &vertices, &indices);
                drop(vertices);
                drop(indices);

                let outcome = match uploaded {
                    Ok(mesh) => target
                        .context()
                        .lock_resources()
                        .populate_mesh(handle, mesh)
                        .map(|()| handle)
                        .map_err(LoadError::from),
                    Err(e) => {
                        // A failed upload frees its slot; the handle is stale from here on.
                        let _ = target.context().lock_resources().destroy_mesh(handle);
                        Err(LoadError::from(e))
                    }
                };

                match &outcome {
                    Ok(_) => log::debug!("mesh {handle} ({}): ready", desc.label),
                    Err(e) => log::warn!("mesh {handle} ({}): {e}", desc.label),
                }

                if let Some(on_ready) = on_ready {
                    target.context().main_queue().post(move || on_ready(outcome));
                }
            }

            ResourceCmd::DestroyTexture(handle) => {
                let released = target.context().lock_resources().destroy_texture(handle);
                match released {
                    // GPU object dropped here, after the lock is released.
                    Ok(texture) => drop(texture),
                    Err(e) => log::warn!("texture destroy ignored: {e}"),
                }
            }

            ResourceCmd::DestroyMesh(handle) => {
                let released = target.context().lock_resources().destroy_mesh(handle);
                match released {
                    Ok(mesh) => drop(mesh),
                    Err(e) => log::warn!("mesh destroy ignored: {e}"),
                }
            }
        }
    }
}
