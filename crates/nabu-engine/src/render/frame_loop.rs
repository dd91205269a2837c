use std::thread;

use crate::command::CommandExecutor;
use crate::context::ProcessContext;
use crate::resource::ResourceCmd;
use crate::scene::SceneCmd;
use crate::time::{FrameClock, FrameTime};
use crate::window::WindowCmd;

use super::{BackendError, PassStats, RenderBackend, RenderState};

/// Counters for one render tick.
#[derive(Debug, Copy, Clone)]
pub struct FrameStats {
    pub time: FrameTime,
    pub resource_commands: usize,
    pub scene_commands: usize,
    pub window_commands: usize,
    pub pass: PassStats,
}

/// Render-thread frame driver: one executor per command category plus the
/// state they act on.
///
/// Not `Send`-constrained: it is built on the render thread (the backend is
/// created there) and never leaves it. Tests drive it directly.
pub struct RenderLoop<B: RenderBackend> {
    ctx: ProcessContext<B>,
    state: RenderState<B>,
    resources: CommandExecutor<ResourceCmd>,
    scenes: CommandExecutor<SceneCmd>,
    windows: CommandExecutor<WindowCmd<B::WindowTarget>>,
    clock: FrameClock,
}

impl<B: RenderBackend> RenderLoop<B> {
    pub fn new(ctx: ProcessContext<B>, backend: B) -> Self {
        let clock = FrameClock::with_interval(ctx.config().render.idle_frame_interval);
        Self {
            state: RenderState::new(ctx.clone(), backend),
            ctx,
            resources: CommandExecutor::new(),
            scenes: CommandExecutor::new(),
            windows: CommandExecutor::new(),
            clock,
        }
    }

    #[inline]
    pub fn state(&self) -> &RenderState<B> {
        &self.state
    }

    /// Drains pending commands without rendering.
    ///
    /// Resources first so a scene submitted in the same frame can resolve
    /// them, windows last so a new window presents the latest scene state.
    pub fn execute_commands(&mut self) -> (usize, usize, usize) {
        let r = self.resources.tick(self.ctx.resource_list(), &mut self.state);
        let s = self.scenes.tick(self.ctx.scene_list(), &mut self.state);
        let w = self.windows.tick(self.ctx.window_list(), &mut self.state);
        (r, s, w)
    }

    /// One full tick: commands, then the frame pass.
    pub fn tick(&mut self) -> Result<FrameStats, BackendError> {
        let time = self.clock.tick();
        let (resource_commands, scene_commands, window_commands) = self.execute_commands();
        let pass = self.state.render_windows()?;

        Ok(FrameStats {
            time,
            resource_commands,
            scene_commands,
            window_commands,
            pass,
        })
    }

    /// Ticks until the process context requests shutdown.
    ///
    /// When nothing was presented (no windows, or all minimized) there is no
    /// present to block on, so the loop sleeps out the rest of the idle
    /// interval instead of spinning.
    pub fn run(&mut self) -> Result<(), BackendError> {
        log::info!("render loop started");

        while !self.ctx.shutdown_requested() {
            let stats = self.tick()?;
            log::trace!("render frame {}: {:?}", stats.time.frame_index, stats.pass);

            if stats.pass.presented == 0 {
                thread::sleep(self.clock.remaining());
            }
        }

        // Apply whatever was queued before shutdown so destroys run and
        // completion callbacks are posted.
        self.execute_commands();
        log::info!("render loop stopped after {} frame(s)", self.clock.frame_index());
        Ok(())
    }

    /// Releases windows, scenes and resources, then the backend.
    pub fn teardown(mut self) {
        self.state.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::config::EngineConfig;
    use crate::device::{HeadlessBackend, HeadlessProbe};
    use crate::handle::MeshHandle;
    use crate::registry::{CameraId, SceneId, WindowId};
    use crate::render::{Acquired, SceneFrame};
    use crate::resource::{LoadError, MeshDesc, ResourceState, TextureDesc, TextureFormat};
    use crate::scene::{Camera, DrawItem};
    use crate::window::Extent;

    fn setup() -> (ProcessContext<HeadlessBackend>, RenderLoop<HeadlessBackend>, HeadlessProbe) {
        let ctx = ProcessContext::new(EngineConfig::without_logging());
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        let render_loop = RenderLoop::new(ctx.clone(), backend);
        (ctx, render_loop, probe)
    }

    fn texture_desc(label: &str) -> TextureDesc {
        TextureDesc::new(label, 1, 1, TextureFormat::Rgba8Srgb)
    }

    fn triangle(ctx: &ProcessContext<HeadlessBackend>, label: &str) -> MeshHandle {
        let vertices: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        ctx.resources().create_mesh(label, &vertices, &[0, 1, 2]).unwrap()
    }

    // ── resources ─────────────────────────────────────────────────────────

    #[test]
    fn upload_becomes_ready_after_tick() {
        let (ctx, mut rl, probe) = setup();
        let h = ctx.resources().create_texture(texture_desc("t"), &[1, 2, 3, 4]).unwrap();

        assert_eq!(ctx.resources().texture_state(h), Some(ResourceState::Pending));
        let stats = rl.tick().unwrap();

        assert_eq!(stats.resource_commands, 1);
        assert_eq!(ctx.resources().texture_state(h), Some(ResourceState::Ready));
        assert_eq!(probe.textures_created(), 1);
    }

    #[test]
    fn completion_runs_on_next_drain() {
        let (ctx, mut rl, _) = setup();
        let (tx, rx) = mpsc::channel();

        let h = ctx
            .resources()
            .create_texture_with(texture_desc("t"), &[0; 4], move |r| {
                let _ = tx.send(r.map_err(|e| e.to_string()));
            })
            .unwrap();

        assert_eq!(ctx.drain_main_queue(), 0);
        rl.tick().unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(ctx.drain_main_queue(), 1);
        assert_eq!(rx.try_recv().unwrap(), Ok(h));
    }

    #[test]
    fn rejected_upload_reports_and_frees_the_slot() {
        let (ctx, mut rl, _) = setup();
        let (tx, rx) = mpsc::channel();

        let h = ctx
            .resources()
            .create_texture_with(texture_desc("short"), &[0; 3], move |r| {
                let _ = tx.send(r);
            })
            .unwrap();

        rl.tick().unwrap();
        ctx.drain_main_queue();

        assert!(matches!(rx.try_recv().unwrap(), Err(LoadError::Backend(_))));
        assert_eq!(ctx.resources().texture_state(h), None);
        assert_eq!(ctx.lock_resources().texture_count(), 0);

        // A late destroy from the caller is a logged no-op.
        ctx.resources().destroy_texture(h);
        assert_eq!(rl.tick().unwrap().resource_commands, 1);
    }

    #[test]
    fn rejected_mesh_frees_the_slot() {
        let (ctx, mut rl, _) = setup();
        let vertices: [[f32; 3]; 3] = [[0.0; 3]; 3];
        let m = ctx.resources().create_mesh("oob", &vertices, &[0, 1, 5]).unwrap();

        rl.tick().unwrap();

        assert_eq!(ctx.resources().mesh_state(m), None);
        assert_eq!(ctx.lock_resources().mesh_count(), 0);
    }

    #[test]
    fn oversized_texture_is_rejected_and_the_loop_keeps_running() {
        let (ctx, mut rl, probe) = setup();
        let (tx, rx) = mpsc::channel();

        let huge = TextureDesc::new("huge", 0x4000_0000, 1, TextureFormat::Rgba8Srgb);
        let h = ctx
            .resources()
            .create_texture_with(huge, &[], move |r| {
                let _ = tx.send(r);
            })
            .unwrap();
        ctx.windows().create(WindowId(1), (), Extent::new(8, 8));

        let stats = rl.tick().unwrap();
        ctx.drain_main_queue();

        assert!(matches!(rx.try_recv().unwrap(), Err(LoadError::Backend(BackendError::Invalid { .. }))));
        assert_eq!(ctx.resources().texture_state(h), None);
        assert_eq!(probe.textures_created(), 0);
        assert_eq!(stats.pass.presented, 1);
    }

    #[test]
    fn create_then_destroy_in_one_batch_frees_the_slot() {
        let (ctx, mut rl, probe) = setup();
        let h = ctx.resources().create_texture(texture_desc("t"), &[0; 4]).unwrap();
        ctx.resources().destroy_texture(h);

        rl.tick().unwrap();

        assert_eq!(probe.textures_created(), 1);
        assert_eq!(ctx.resources().texture_state(h), None);
        assert_eq!(ctx.lock_resources().texture_count(), 0);
    }

    #[test]
    fn double_destroy_is_ignored() {
        let (ctx, mut rl, _) = setup();
        let m = triangle(&ctx, "m");
        rl.tick().unwrap();

        ctx.resources().destroy_mesh(m);
        ctx.resources().destroy_mesh(m);
        let stats = rl.tick().unwrap();

        assert_eq!(stats.resource_commands, 2);
        assert_eq!(ctx.resources().mesh_state(m), None);
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn bound_scene_is_presented_with_resolved_draws() {
        let (ctx, mut rl, probe) = setup();
        let window = WindowId(1);
        let scene = SceneId(7);
        let camera = CameraId(0);

        let mesh = triangle(&ctx, "tri");
        let tex = ctx.resources().create_texture(texture_desc("checker"), &[0; 4]).unwrap();

        ctx.scenes().create(scene);
        ctx.scenes().set_camera(scene, camera, Camera::default());
        ctx.scenes().submit(scene, vec![DrawItem::new(mesh).with_texture(tex), DrawItem::new(mesh)]);
        ctx.windows().create(window, (), Extent::new(64, 64));
        ctx.windows().set_scene(window, scene, camera);

        let stats = rl.tick().unwrap();
        assert_eq!(stats.pass.presented, 1);
        assert_eq!(stats.pass.draws_submitted, 2);

        let frame = probe.last_frame(window).unwrap();
        assert_eq!(frame.scene, Some(scene));
        assert_eq!(frame.camera, Some(camera));
        assert_eq!(frame.draws[0].mesh, "tri");
        assert_eq!(frame.draws[0].texture.as_deref(), Some("checker"));
        assert_eq!(frame.draws[1].texture, None);
    }

    #[test]
    fn stale_draws_are_dropped_not_drawn() {
        let (ctx, mut rl, probe) = setup();
        let window = WindowId(1);
        let scene = SceneId(1);

        let mesh = triangle(&ctx, "old");
        rl.tick().unwrap();
        ctx.resources().destroy_mesh(mesh);
        rl.tick().unwrap();

        // Reuses the freed slot with a newer generation.
        let fresh = triangle(&ctx, "new");
        assert_eq!(fresh.raw().index(), mesh.raw().index());

        ctx.scenes().create(scene);
        ctx.scenes().submit(scene, vec![DrawItem::new(mesh), DrawItem::new(fresh)]);
        ctx.windows().create(window, (), Extent::new(8, 8));
        ctx.windows().set_scene(window, scene, CameraId(0));

        let stats = rl.tick().unwrap();
        assert_eq!(stats.pass.draws_dropped, 1);
        assert_eq!(stats.pass.draws_submitted, 1);
        assert_eq!(probe.last_frame(window).unwrap().draws[0].mesh, "new");
    }

    #[test]
    fn rejected_texture_drops_the_draw() {
        let (ctx, mut rl, _) = setup();
        let window = WindowId(1);
        let scene = SceneId(1);

        let mesh = triangle(&ctx, "m");
        // Payload is rejected, so the handle is stale by the time the frame resolves it.
        let tex = ctx.resources().create_texture(texture_desc("bad"), &[]).unwrap();

        ctx.scenes().create(scene);
        ctx.scenes().submit(scene, vec![DrawItem::new(mesh).with_texture(tex)]);
        ctx.windows().create(window, (), Extent::new(8, 8));
        ctx.windows().set_scene(window, scene, CameraId(0));

        let stats = rl.tick().unwrap();
        assert_eq!(stats.pass.draws_dropped, 1);
    }

    #[test]
    fn unbound_window_clears_with_default_color() {
        let (ctx, mut rl, probe) = setup();
        let window = WindowId(3);
        ctx.windows().create(window, (), Extent::new(8, 8));

        rl.tick().unwrap();

        let frame = probe.last_frame(window).unwrap();
        assert_eq!(frame.scene, None);
        assert_eq!(frame.clear_color, ctx.config().render.clear_color);
        assert!(frame.draws.is_empty());
    }

    #[test]
    fn destroying_a_scene_unbinds_its_windows() {
        let (ctx, mut rl, probe) = setup();
        let window = WindowId(1);
        let scene = SceneId(1);

        ctx.scenes().create(scene);
        ctx.scenes().set_clear_color(scene, [1.0, 0.0, 0.0, 1.0]);
        ctx.windows().create(window, (), Extent::new(8, 8));
        ctx.windows().set_scene(window, scene, CameraId(0));
        rl.tick().unwrap();
        assert_eq!(probe.last_frame(window).unwrap().clear_color, [1.0, 0.0, 0.0, 1.0]);

        ctx.scenes().destroy(scene);
        rl.tick().unwrap();

        assert_eq!(rl.state().window(window).unwrap().binding(), None);
        assert_eq!(probe.last_frame(window).unwrap().scene, None);
    }

    #[test]
    fn minimized_window_is_skipped() {
        let (ctx, mut rl, _) = setup();
        let window = WindowId(1);
        ctx.windows().create(window, (), Extent::new(8, 8));
        rl.tick().unwrap();

        ctx.windows().resize(window, Extent::new(0, 0));
        let stats = rl.tick().unwrap();

        assert_eq!(stats.pass.presented, 0);
        assert_eq!(stats.pass.skipped, 1);
        let w = rl.state().window(window).unwrap();
        assert_eq!((w.frames_presented(), w.frames_skipped()), (1, 1));
    }

    /// Backend that only notes whether the store was locked while encoding.
    struct LockWitness {
        ctx: ProcessContext<LockWitness>,
        locked_during_encode: Vec<bool>,
    }

    impl RenderBackend for LockWitness {
        type Texture = ();
        type Mesh = ();
        type Surface = ();
        type Frame = ();
        type WindowTarget = ();

        fn create_texture(&mut self, _: &TextureDesc, _: &[u8]) -> Result<(), BackendError> {
            Ok(())
        }

        fn create_mesh(&mut self, _: &MeshDesc, _: &[u8], _: &[u32]) -> Result<(), BackendError> {
            Ok(())
        }

        fn create_surface(&mut self, _: WindowId, _: (), _: Extent) -> Result<(), BackendError> {
            Ok(())
        }

        fn resize_surface(&mut self, _: &mut (), _: Extent) {}

        fn reconfigure_surface(&mut self, _: &mut ()) {}

        fn acquire_frame(&mut self, _: &mut ()) -> Result<Acquired<()>, BackendError> {
            Ok(Acquired::Frame(()))
        }

        fn encode_frame(&mut self, _: &mut (), scene: &SceneFrame<'_, Self>) {
            assert_eq!(scene.draws.len(), 1);
            self.locked_during_encode.push(self.ctx.resources_locked());
        }

        fn present_frame(&mut self, _: &mut (), _: ()) {}
    }

    #[test]
    fn store_is_unlocked_while_encoding() {
        let ctx: ProcessContext<LockWitness> = ProcessContext::new(EngineConfig::without_logging());
        let backend = LockWitness {
            ctx: ctx.clone(),
            locked_during_encode: Vec::new(),
        };
        let mut rl = RenderLoop::new(ctx.clone(), backend);

        let vertices: [[f32; 3]; 3] = [[0.0; 3]; 3];
        let mesh = ctx.resources().create_mesh("m", &vertices, &[0, 1, 2]).unwrap();
        ctx.scenes().create(SceneId(1));
        ctx.scenes().submit(SceneId(1), vec![DrawItem::new(mesh)]);
        ctx.windows().create(WindowId(1), (), Extent::new(8, 8));
        ctx.windows().set_scene(WindowId(1), SceneId(1), CameraId(0));

        let stats = rl.tick().unwrap();

        assert_eq!(stats.pass.draws_submitted, 1);
        assert_eq!(rl.state().backend().locked_during_encode, [false]);
    }

    // ── windows ───────────────────────────────────────────────────────────

    #[test]
    fn duplicate_window_builds_one_surface() {
        let (ctx, mut rl, probe) = setup();
        ctx.windows().create(WindowId(1), (), Extent::new(8, 8));
        ctx.windows().create(WindowId(1), (), Extent::new(16, 16));

        rl.tick().unwrap();

        assert_eq!(probe.surfaces_created(), 1);
        assert_eq!(rl.state().window_count(), 1);
        assert_eq!(rl.state().window(WindowId(1)).unwrap().size(), Extent::new(8, 8));
    }

    #[test]
    fn set_scene_to_unknown_scene_keeps_binding() {
        let (ctx, mut rl, _) = setup();
        let window = WindowId(1);
        ctx.scenes().create(SceneId(1));
        ctx.windows().create(window, (), Extent::new(8, 8));
        ctx.windows().set_scene(window, SceneId(1), CameraId(2));
        rl.tick().unwrap();

        ctx.windows().set_scene(window, SceneId(99), CameraId(0));
        rl.tick().unwrap();

        let binding = rl.state().window(window).unwrap().binding().unwrap();
        assert_eq!(binding.scene, SceneId(1));
        assert_eq!(binding.camera, CameraId(2));
    }

    #[test]
    fn null_scene_clears_an_existing_binding() {
        let (ctx, mut rl, probe) = setup();
        let window = WindowId(3);
        let scene = SceneId(1);

        ctx.scenes().create(scene);
        ctx.scenes().set_clear_color(scene, [0.0, 1.0, 0.0, 1.0]);
        ctx.windows().create(window, (), Extent::new(8, 8));
        ctx.windows().set_scene(window, scene, CameraId(0));
        rl.tick().unwrap();
        assert_eq!(probe.last_frame(window).unwrap().scene, Some(scene));

        ctx.windows().set_scene(window, SceneId::NULL, CameraId(0));
        rl.tick().unwrap();

        assert_eq!(rl.state().window(window).unwrap().binding(), None);
        let frame = probe.last_frame(window).unwrap();
        assert_eq!(frame.scene, None);
        assert_eq!(frame.clear_color, ctx.config().render.clear_color);
        // The scene itself is untouched.
        assert!(rl.state().scene(scene).is_some());
    }

    #[test]
    fn clearing_scene_of_unknown_window_is_a_no_op() {
        let (ctx, mut rl, _) = setup();
        ctx.windows().clear_scene(WindowId(42));

        let stats = rl.tick().unwrap();
        assert_eq!(stats.window_commands, 1);
        assert_eq!(rl.state().window_count(), 0);
    }

    #[test]
    fn destroyed_window_stops_presenting() {
        let (ctx, mut rl, probe) = setup();
        ctx.windows().create(WindowId(1), (), Extent::new(8, 8));
        rl.tick().unwrap();
        ctx.windows().destroy(WindowId(1));
        rl.tick().unwrap();
        rl.tick().unwrap();

        assert_eq!(probe.frames_presented(), 1);
        assert_eq!(rl.state().window_count(), 0);
    }

    #[test]
    fn teardown_releases_everything() {
        let (ctx, mut rl, _) = setup();
        let _ = triangle(&ctx, "m");
        let _ = ctx.resources().create_texture(texture_desc("t"), &[0; 4]).unwrap();
        ctx.scenes().create(SceneId(1));
        rl.tick().unwrap();

        rl.teardown();

        let store = ctx.lock_resources();
        assert_eq!((store.texture_count(), store.mesh_count()), (0, 0));
    }
}
