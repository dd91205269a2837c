use std::sync::Arc;

use crate::handle::{HandleError, HandleTable, MeshHandle, TableError, TextureHandle};
use crate::render::RenderBackend;

use super::{MeshDesc, TextureDesc};

/// Whether a live slot already holds its GPU object.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceState {
    /// Handle reserved; upload not yet applied by the render thread (or failed).
    Pending,
    Ready,
}

/// Texture slot: the descriptor it was created with and, once uploaded, the
/// backend object.
///
/// GPU objects are shared so the frame pass can hold on to them after the
/// store lock is released.
pub struct TextureSlot<B: RenderBackend> {
    pub desc: TextureDesc,
    pub gpu: Option<Arc<B::Texture>>,
}

impl<B: RenderBackend> Default for TextureSlot<B> {
    fn default() -> Self {
        Self {
            desc: TextureDesc::default(),
            gpu: None,
        }
    }
}

pub struct MeshSlot<B: RenderBackend> {
    pub desc: MeshDesc,
    pub gpu: Option<Arc<B::Mesh>>,
}

impl<B: RenderBackend> Default for MeshSlot<B> {
    fn default() -> Self {
        Self {
            desc: MeshDesc::default(),
            gpu: None,
        }
    }
}

/// Handle-addressed storage for every GPU resource kind.
///
/// Mutated by the resource executor on the render thread. The main thread
/// touches it only through the process context's narrow lock, to reserve
/// slots and to check liveness.
pub struct ResourceStore<B: RenderBackend> {
    textures: HandleTable<TextureSlot<B>>,
    meshes: HandleTable<MeshSlot<B>>,
}

impl<B: RenderBackend> Default for ResourceStore<B> {
    fn default() -> Self {
        Self::with_capacity(0, 0)
    }
}

impl<B: RenderBackend> ResourceStore<B> {
    pub fn with_capacity(textures: usize, meshes: usize) -> Self {
        Self {
            textures: HandleTable::with_capacity(textures),
            meshes: HandleTable::with_capacity(meshes),
        }
    }

    // ── textures ──────────────────────────────────────────────────────────

    pub fn reserve_texture(&mut self, desc: TextureDesc) -> Result<TextureHandle, TableError> {
        let handle = self.textures.create(TextureSlot { desc, gpu: None })?;
        Ok(TextureHandle::from_raw(handle))
    }

    /// Stores the uploaded object. If the slot was freed in the meantime the
    /// object is dropped and the reason returned.
    pub fn populate_texture(&mut self, handle: TextureHandle, texture: B::Texture) -> Result<(), HandleError> {
        self.textures.validate(handle.raw())?;
        if let Some(slot) = self.textures.get_mut(handle.raw()) {
            slot.gpu = Some(Arc::new(texture));
        }
        Ok(())
    }

    /// Frees the slot and hands back the GPU object (if it was uploaded) so
    /// the caller can release it outside the store lock.
    pub fn destroy_texture(&mut self, handle: TextureHandle) -> Result<Option<Arc<B::Texture>>, HandleError> {
        self.textures.validate(handle.raw())?;
        Ok(self.textures.take(handle.raw()).and_then(|slot| slot.gpu))
    }

    /// Ready texture behind `handle`, if any.
    pub fn texture(&self, handle: TextureHandle) -> Option<&Arc<B::Texture>> {
        self.textures.get(handle.raw())?.gpu.as_ref()
    }

    pub fn texture_desc(&self, handle: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(handle.raw()).map(|slot| &slot.desc)
    }

    pub fn texture_state(&self, handle: TextureHandle) -> Option<ResourceState> {
        self.textures.get(handle.raw()).map(|slot| state_of(&slot.gpu))
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    // ── meshes ────────────────────────────────────────────────────────────

    pub fn reserve_mesh(&mut self, desc: MeshDesc) -> Result<MeshHandle, TableError> {
        let handle = self.meshes.create(MeshSlot { desc, gpu: None })?;
        Ok(MeshHandle::from_raw(handle))
    }

    pub fn populate_mesh(&mut self, handle: MeshHandle, mesh: B::Mesh) -> Result<(), HandleError> {
        self.meshes.validate(handle.raw())?;
        if let Some(slot) = self.meshes.get_mut(handle.raw()) {
            slot.gpu = Some(Arc::new(mesh));
        }
        Ok(())
    }

    pub fn destroy_mesh(&mut self, handle: MeshHandle) -> Result<Option<Arc<B::Mesh>>, HandleError> {
        self.meshes.validate(handle.raw())?;
        Ok(self.meshes.take(handle.raw()).and_then(|slot| slot.gpu))
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Arc<B::Mesh>> {
        self.meshes.get(handle.raw())?.gpu.as_ref()
    }

    pub fn mesh_desc(&self, handle: MeshHandle) -> Option<&MeshDesc> {
        self.meshes.get(handle.raw()).map(|slot| &slot.desc)
    }

    pub fn mesh_state(&self, handle: MeshHandle) -> Option<ResourceState> {
        self.meshes.get(handle.raw()).map(|slot| state_of(&slot.gpu))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Frees every slot. Used when the render thread shuts down.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.meshes.clear();
    }
}

fn state_of<T>(gpu: &Option<T>) -> ResourceState {
    if gpu.is_some() {
        ResourceState::Ready
    } else {
        ResourceState::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessBackend;
    use crate::device::HeadlessTexture;
    use crate::resource::TextureFormat;

    fn desc() -> TextureDesc {
        TextureDesc::new("t", 1, 1, TextureFormat::Rgba8Srgb)
    }

    fn headless_texture() -> HeadlessTexture {
        HeadlessTexture {
            desc: desc(),
            pixels: vec![1, 2, 3, 4],
        }
    }

    #[test]
    fn reserved_texture_is_pending_until_populated() {
        let mut store: ResourceStore<HeadlessBackend> = ResourceStore::default();
        let h = store.reserve_texture(desc()).unwrap();

        assert_eq!(store.texture_state(h), Some(ResourceState::Pending));
        assert!(store.texture(h).is_none());

        store.populate_texture(h, headless_texture()).unwrap();
        assert_eq!(store.texture_state(h), Some(ResourceState::Ready));
        assert_eq!(store.texture(h).map(|t| t.pixels.len()), Some(4));
    }

    #[test]
    fn destroy_returns_uploaded_object() {
        let mut store: ResourceStore<HeadlessBackend> = ResourceStore::default();
        let h = store.reserve_texture(desc()).unwrap();
        store.populate_texture(h, headless_texture()).unwrap();

        let released = store.destroy_texture(h).unwrap();
        assert!(released.is_some());
        assert_eq!(store.texture_state(h), None);
        assert!(store.destroy_texture(h).is_err());
    }

    #[test]
    fn populate_after_destroy_is_rejected() {
        let mut store: ResourceStore<HeadlessBackend> = ResourceStore::default();
        let h = store.reserve_texture(desc()).unwrap();
        assert!(store.destroy_texture(h).unwrap().is_none());

        let err = store.populate_texture(h, headless_texture()).unwrap_err();
        assert!(matches!(err, HandleError::Tombstoned { .. }));
    }

    #[test]
    fn texture_and_mesh_tables_are_independent() {
        let mut store: ResourceStore<HeadlessBackend> = ResourceStore::default();
        let t = store.reserve_texture(desc()).unwrap();
        let m = store.reserve_mesh(MeshDesc::of::<[f32; 3]>("m", 3, 3)).unwrap();

        // Same slot index in different tables.
        assert_eq!(t.raw().index(), m.raw().index());
        store.destroy_mesh(m).unwrap();
        assert_eq!(store.texture_state(t), Some(ResourceState::Pending));
        assert_eq!(store.mesh_count(), 0);
    }
}
