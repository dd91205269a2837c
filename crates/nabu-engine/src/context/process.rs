use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::command::CommandList;
use crate::config::EngineConfig;
use crate::logging::init_logging;
use crate::main_queue::MainThreadQueue;
use crate::render::RenderBackend;
use crate::resource::{ResourceCmd, ResourceCommands, ResourceStore};
use crate::scene::{SceneCmd, SceneCommands};
use crate::window::{WindowCmd, WindowCommands};

struct Shared<B: RenderBackend> {
    config: EngineConfig,
    resource_list: CommandList<ResourceCmd>,
    scene_list: CommandList<SceneCmd>,
    window_list: CommandList<WindowCmd<B::WindowTarget>>,
    resources: Mutex<ResourceStore<B>>,
    main_queue: MainThreadQueue,
    shutdown: AtomicBool,
}

/// Shared handle to the process-wide engine state.
///
/// Producers (`resources()`, `scenes()`, `windows()`) append commands from
/// any thread, typically the main one. The render thread drains them.
pub struct ProcessContext<B: RenderBackend> {
    shared: Arc<Shared<B>>,
}

impl<B: RenderBackend> Clone for ProcessContext<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: RenderBackend> ProcessContext<B> {
    pub fn new(config: EngineConfig) -> Self {
        if let Some(logging) = config.logging.clone() {
            init_logging(logging);
        }

        let store = ResourceStore::with_capacity(config.render.texture_capacity, config.render.mesh_capacity);

        Self {
            shared: Arc::new(Shared {
                resource_list: CommandList::new("resources"),
                scene_list: CommandList::new("scenes"),
                window_list: CommandList::new("windows"),
                resources: Mutex::new(store),
                main_queue: MainThreadQueue::new(),
                shutdown: AtomicBool::new(false),
                config,
            }),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn resources(&self) -> ResourceCommands<'_, B> {
        ResourceCommands::new(self)
    }

    pub fn scenes(&self) -> SceneCommands<'_, B> {
        SceneCommands::new(self)
    }

    pub fn windows(&self) -> WindowCommands<'_, B> {
        WindowCommands::new(self)
    }

    #[inline]
    pub fn main_queue(&self) -> &MainThreadQueue {
        &self.shared.main_queue
    }

    /// Runs every callback posted to the main thread so far. Call once per
    /// main-thread frame.
    pub fn drain_main_queue(&self) -> usize {
        self.shared.main_queue.drain_and_run()
    }

    /// Locks the resource store. Keep the guard short-lived; the render
    /// thread takes it to resolve each frame's draws.
    pub fn lock_resources(&self) -> MutexGuard<'_, ResourceStore<B>> {
        self.shared.resources.lock()
    }

    #[cfg(test)]
    pub(crate) fn resources_locked(&self) -> bool {
        self.shared.resources.is_locked()
    }

    pub fn request_shutdown(&self) {
        if !self.shared.shutdown.swap(true, Ordering::AcqRel) {
            log::info!("shutdown requested");
        }
    }

    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    pub(crate) fn resource_list(&self) -> &CommandList<ResourceCmd> {
        &self.shared.resource_list
    }

    pub(crate) fn scene_list(&self) -> &CommandList<SceneCmd> {
        &self.shared.scene_list
    }

    pub(crate) fn window_list(&self) -> &CommandList<WindowCmd<B::WindowTarget>> {
        &self.shared.window_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessBackend;

    #[test]
    fn clones_share_state() {
        let a: ProcessContext<HeadlessBackend> = ProcessContext::new(EngineConfig::without_logging());
        let b = a.clone();

        a.scenes().create(crate::registry::SceneId(1));
        assert_eq!(b.scene_list().pending(), 1);

        b.request_shutdown();
        assert!(a.shutdown_requested());
    }

    #[test]
    fn handles_are_reserved_synchronously() {
        let ctx: ProcessContext<HeadlessBackend> = ProcessContext::new(EngineConfig::without_logging());
        let h = ctx
            .resources()
            .create_texture(
                crate::resource::TextureDesc::new("t", 1, 1, Default::default()),
                &[0, 0, 0, 255],
            )
            .unwrap();

        assert_eq!(
            ctx.resources().texture_state(h),
            Some(crate::resource::ResourceState::Pending)
        );
        assert_eq!(ctx.resource_list().pending(), 1);
    }
}
