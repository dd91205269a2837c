use bytemuck::Pod;

use crate::context::ProcessContext;
use crate::handle::{MeshHandle, TableError, TextureHandle};
use crate::render::RenderBackend;

use super::{Completion, LoadError, MeshDesc, ResourceCmd, ResourceState, TextureDesc};

/// Main-thread producer API for resource commands.
///
/// `create_*` reserves the handle immediately; the GPU object appears once
/// the render thread has applied the command. Payloads are copied here, so
/// the caller may reuse its buffers as soon as the call returns.
pub struct ResourceCommands<'a, B: RenderBackend> {
    ctx: &'a ProcessContext<B>,
}

impl<'a, B: RenderBackend> ResourceCommands<'a, B> {
    pub(crate) fn new(ctx: &'a ProcessContext<B>) -> Self {
        Self { ctx }
    }

    pub fn create_texture(&self, desc: TextureDesc, pixels: &[u8]) -> Result<TextureHandle, TableError> {
        self.enqueue_texture(desc, pixels, None)
    }

    /// Like `create_texture`; `on_ready` runs on the main thread after the
    /// upload was applied (or failed).
    ///
    /// A rejected upload releases the handle before `on_ready` sees the error,
    /// so there is nothing left to destroy.
    pub fn create_texture_with<F>(
        &self,
        desc: TextureDesc,
        pixels: &[u8],
        on_ready: F,
    ) -> Result<TextureHandle, TableError>
    where
        F: FnOnce(Result<TextureHandle, LoadError>) + Send + 'static,
    {
        self.enqueue_texture(desc, pixels, Some(Box::new(on_ready)))
    }

    /// Creates a mesh from typed vertices.
    pub fn create_mesh<V: Pod>(
        &self,
        label: &str,
        vertices: &[V],
        indices: &[u32],
    ) -> Result<MeshHandle, TableError> {
        self.enqueue_mesh(label, vertices, indices, None)
    }

    pub fn create_mesh_with<V, F>(
        &self,
        label: &str,
        vertices: &[V],
        indices: &[u32],
        on_ready: F,
    ) -> Result<MeshHandle, TableError>
    where
        V: Pod,
        F: FnOnce(Result<MeshHandle, LoadError>) + Send + 'static,
    {
        self.enqueue_mesh(label, vertices, indices, Some(Box::new(on_ready)))
    }

    pub fn destroy_texture(&self, handle: TextureHandle) {
        self.ctx.resource_list().append(ResourceCmd::DestroyTexture(handle));
    }

    pub fn destroy_mesh(&self, handle: MeshHandle) {
        self.ctx.resource_list().append(ResourceCmd::DestroyMesh(handle));
    }

    /// Liveness as seen right now by the render thread.
    ///
    /// `None` once the destroy command has been applied. Safe from any thread.
    pub fn texture_state(&self, handle: TextureHandle) -> Option<ResourceState> {
        self.ctx.lock_resources().texture_state(handle)
    }

    pub fn mesh_state(&self, handle: MeshHandle) -> Option<ResourceState> {
        self.ctx.lock_resources().mesh_state(handle)
    }

    fn enqueue_texture(
        &self,
        desc: TextureDesc,
        pixels: &[u8],
        on_ready: Option<Completion<TextureHandle>>,
    ) -> Result<TextureHandle, TableError> {
        let handle = self.ctx.lock_resources().reserve_texture(desc.clone())?;

        self.ctx.resource_list().append(ResourceCmd::CreateTexture {
            handle,
            desc,
            pixels: pixels.to_vec(),
            on_ready,
        });

        Ok(handle)
    }

    fn enqueue_mesh<V: Pod>(
        &self,
        label: &str,
        vertices: &[V],
        indices: &[u32],
        on_ready: Option<Completion<MeshHandle>>,
    ) -> Result<MeshHandle, TableError> {
        let desc = MeshDesc::of::<V>(label, vertices.len(), indices.len());
        let handle = self.ctx.lock_resources().reserve_mesh(desc.clone())?;

        self.ctx.resource_list().append(ResourceCmd::CreateMesh {
            handle,
            desc,
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            indices: indices.to_vec(),
            on_ready,
        });

        Ok(handle)
    }
}
