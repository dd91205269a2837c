use std::thread::{self, JoinHandle};

use crate::context::ProcessContext;
use crate::error::EngineError;

use super::{RenderBackend, RenderLoop};

/// Owner of the spawned render thread.
///
/// Dropping without calling `shutdown` requests shutdown and detaches.
pub struct RenderThread {
    handle: Option<JoinHandle<Result<(), EngineError>>>,
    request_stop: Box<dyn Fn() + Send>,
}

impl RenderThread {
    /// Spawns the render thread.
    ///
    /// `make_backend` runs on the new thread, so backend objects that must
    /// stay on the render thread are created there.
    pub fn spawn<B, F>(ctx: ProcessContext<B>, make_backend: F) -> Result<Self, EngineError>
    where
        B: RenderBackend,
        F: FnOnce() -> anyhow::Result<B> + Send + 'static,
    {
        let name = ctx.config().render.thread_name.clone();
        let thread_ctx = ctx.clone();

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                // However this thread ends, the main thread gets to notice and wind down.
                let _exit = ShutdownOnExit(thread_ctx.clone());

                let backend = match make_backend() {
                    Ok(b) => b,
                    Err(e) => {
                        log::error!("backend initialization failed: {e:#}");
                        return Err(EngineError::BackendInit(format!("{e:#}")));
                    }
                };

                let mut render_loop = RenderLoop::new(thread_ctx, backend);
                let result = render_loop.run();
                render_loop.teardown();

                if let Err(e) = &result {
                    log::error!("render loop aborted: {e}");
                }
                result.map_err(EngineError::from)
            })
            .map_err(EngineError::Spawn)?;

        Ok(Self {
            handle: Some(handle),
            request_stop: Box::new(move || ctx.request_shutdown()),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Requests shutdown and waits for the render thread to exit.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        (self.request_stop)();
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<(), EngineError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(EngineError::RenderThreadPanicked),
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            (self.request_stop)();
        }
    }
}

/// Raises the shutdown flag when dropped, including during a panic unwind.
struct ShutdownOnExit<B: RenderBackend>(ProcessContext<B>);

impl<B: RenderBackend> Drop for ShutdownOnExit<B> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("render thread panicked");
        }
        self.0.request_shutdown();
    }
}
