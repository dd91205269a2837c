use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::Window;

use crate::config::EngineConfig;
use crate::context::ProcessContext;
use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GpuInit, WgpuBackend};
use crate::registry::{CameraId, SceneId, WindowId};
use crate::render::RenderThread;
use crate::time::FrameClock;

/// Parameters of one OS window.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Scene bound as soon as the window reaches the render thread.
    pub scene: Option<(SceneId, CameraId)>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "nabu".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            scene: None,
        }
    }
}

/// Main-thread runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub window: WindowConfig,
    /// Pacing of `App::on_frame`. Independent of the render thread's rate.
    pub main_frame_interval: Duration,
    pub engine: EngineConfig,
    pub gpu: GpuInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            main_frame_interval: Duration::from_millis(16),
            engine: EngineConfig::default(),
            gpu: GpuInit::default(),
        }
    }
}

/// Runtime requests from app callbacks.
///
/// Buffered and applied after the current callback returns. Window ids are
/// assigned here, so the caller can use them right away.
pub struct RuntimeCtx {
    commands: Vec<Command>,
    next_window: u64,
}

impl RuntimeCtx {
    fn new(next_window: u64) -> Self {
        Self {
            commands: Vec::new(),
            next_window,
        }
    }

    pub fn create_window(&mut self, config: WindowConfig) -> WindowId {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.commands.push(Command::CreateWindow(id, config));
        id
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::CloseWindow(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    CreateWindow(WindowId, WindowConfig),
    CloseWindow(WindowId),
    Exit,
}

/// Entry point: runs the winit loop on the calling (main) thread and the
/// render loop on its own thread until the last window closes.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let ctx: ProcessContext<WgpuBackend> = ProcessContext::new(config.engine.clone());

        let gpu = config.gpu.clone();
        let render = RenderThread::spawn(ctx.clone(), move || WgpuBackend::new(gpu))?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, ctx, app);

        let loop_result = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        state.app.on_exit(&state.ctx);
        let render_result = render.shutdown();

        // Completion callbacks posted during teardown.
        state.ctx.drain_main_queue();

        // Windows are dropped here, on the main thread, after the render
        // thread released its references.
        drop(state);

        loop_result?;
        render_result?;
        Ok(())
    }
}

struct WindowEntry {
    id: WindowId,
    window: Arc<Window>,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    ctx: ProcessContext<WgpuBackend>,
    app: A,

    windows: HashMap<winit::window::WindowId, WindowEntry>,
    /// Creation order, for `FrameCtx::windows`.
    order: Vec<WindowId>,
    /// Closed windows the render thread may still hold.
    closing: Vec<Arc<Window>>,
    next_window: u64,

    clock: FrameClock,
    started: bool,
    exit_requested: bool,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, ctx: ProcessContext<WgpuBackend>, app: A) -> Self {
        let clock = FrameClock::with_interval(config.main_frame_interval);
        Self {
            config,
            ctx,
            app,
            windows: HashMap::new(),
            order: Vec::new(),
            closing: Vec::new(),
            next_window: 0,
            clock,
            started: false,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop, id: WindowId, config: WindowConfig) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size);

        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);
        let size = window.inner_size().into();

        let windows = self.ctx.windows();
        windows.create(id, Arc::clone(&window), size);
        if let Some((scene, camera)) = config.scene {
            windows.set_scene(id, scene, camera);
        }

        log::info!("{id}: opened ({size})");
        self.windows.insert(window.id(), WindowEntry { id, window });
        self.order.push(id);
        Ok(())
    }

    fn close_window(&mut self, id: WindowId) {
        let Some(key) = self.windows.iter().find(|(_, e)| e.id == id).map(|(k, _)| *k) else {
            return;
        };
        if let Some(entry) = self.windows.remove(&key) {
            self.ctx.windows().destroy(id);
            entry.window.set_visible(false);
            self.closing.push(entry.window);
            self.order.retain(|w| *w != id);
            log::info!("{id}: closed");
        }
    }

    /// Drops closed windows once the render thread has released its surface.
    fn reap_closed(&mut self) {
        self.closing.retain(|w| Arc::strong_count(w) > 1);
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, runtime: RuntimeCtx) {
        self.next_window = runtime.next_window;

        for cmd in runtime.commands {
            match cmd {
                Command::CreateWindow(id, config) => {
                    if let Err(e) = self.open_window(event_loop, id, config) {
                        log::error!("{id}: {e:#}");
                    }
                }
                Command::CloseWindow(id) => self.close_window(id),
                Command::Exit => self.request_exit(event_loop),
            }
        }

        if self.windows.is_empty() {
            self.request_exit(event_loop);
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) {
        self.started = true;

        let id = WindowId(self.next_window);
        self.next_window += 1;
        if let Err(e) = self.open_window(event_loop, id, self.config.window.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit(event_loop);
            return;
        }

        let mut runtime = RuntimeCtx::new(self.next_window);
        let time = self.clock.tick();
        let control = {
            let mut frame = FrameCtx {
                engine: &self.ctx,
                runtime: &mut runtime,
                windows: &self.order,
                time,
            };
            self.app.on_start(&mut frame)
        };

        if control == AppControl::Exit {
            runtime.exit();
        }
        self.apply_commands(event_loop, runtime);
    }

    /// One main-thread frame: load callbacks, then the app.
    fn main_frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.shutdown_requested() {
            log::warn!("render thread stopped; exiting");
            self.request_exit(event_loop);
            return;
        }

        self.ctx.drain_main_queue();
        self.reap_closed();

        let mut runtime = RuntimeCtx::new(self.next_window);
        let time = self.clock.tick();
        let control = {
            let mut frame = FrameCtx {
                engine: &self.ctx,
                runtime: &mut runtime,
                windows: &self.order,
                time,
            };
            self.app.on_frame(&mut frame)
        };

        if control == AppControl::Exit {
            runtime.exit();
        }
        self.apply_commands(event_loop, runtime);
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.started {
            self.start(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.started && self.clock.remaining().is_zero() {
            self.main_frame(event_loop);
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_deadline()));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: winit::window::WindowId, event: WindowEvent) {
        let Some(entry) = self.windows.get(&window_id) else {
            return;
        };
        let id = entry.id;

        if self.app.on_window_event(id, &event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.close_window(id);
                if self.windows.is_empty() {
                    self.request_exit(event_loop);
                }
            }

            WindowEvent::Resized(size) => {
                self.ctx.windows().resize(id, (*size).into());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.window.inner_size();
                self.ctx.windows().resize(id, size.into());
            }

            _ => {}
        }
    }
}
