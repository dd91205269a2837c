use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use nabu_engine::core::{App, AppControl, FrameCtx};
use nabu_engine::device::MeshVertex;
use nabu_engine::handle::{MeshHandle, TextureHandle};
use nabu_engine::registry::{CameraId, SceneId, WindowId};
use nabu_engine::resource::{TextureDesc, TextureFormat};
use nabu_engine::scene::{Camera, DrawItem};
use nabu_engine::window::{Runtime, RuntimeConfig, WindowConfig};

const SCENE: SceneId = SceneId(0);
const MAIN_CAMERA: CameraId = CameraId(0);
const WIDE_CAMERA: CameraId = CameraId(1);

const QUAD: [MeshVertex; 4] = [
    MeshVertex { position: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
    MeshVertex { position: [0.5, -0.5, 0.0], uv: [1.0, 1.0] },
    MeshVertex { position: [0.5, 0.5, 0.0], uv: [1.0, 0.0] },
    MeshVertex { position: [-0.5, 0.5, 0.0], uv: [0.0, 0.0] },
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Spinning textured quad; `N` opens a second window on the same scene,
/// `Esc` quits.
struct Viewer {
    quad: MeshHandle,
    checker: TextureHandle,
    checker_ready: Arc<AtomicBool>,
    angle: f32,
    open_wide: bool,
}

impl Viewer {
    fn new() -> Self {
        Self {
            quad: MeshHandle::NULL,
            checker: TextureHandle::NULL,
            checker_ready: Arc::new(AtomicBool::new(false)),
            angle: 0.0,
            open_wide: false,
        }
    }
}

impl App for Viewer {
    fn on_start(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let resources = ctx.engine.resources();

        let (w, h, pixels) = checker(8, 32);
        let ready = Arc::clone(&self.checker_ready);
        let texture = resources.create_texture_with(
            TextureDesc::new("checker", w, h, TextureFormat::Rgba8Srgb),
            &pixels,
            move |result| match result {
                Ok(handle) => {
                    log::info!("{handle} uploaded");
                    ready.store(true, Ordering::Release);
                }
                Err(e) => log::error!("checker upload failed: {e}"),
            },
        );

        let quad = resources.create_mesh_with("quad", &QUAD, &QUAD_INDICES, |result| {
            if let Err(e) = result {
                log::error!("quad upload failed: {e}");
            }
        });

        match (texture, quad) {
            (Ok(t), Ok(q)) => {
                self.checker = t;
                self.quad = q;
            }
            (Err(e), _) | (_, Err(e)) => {
                log::error!("resource table full: {e}");
                return AppControl::Exit;
            }
        }

        let scenes = ctx.engine.scenes();
        scenes.create(SCENE);
        scenes.set_camera(SCENE, MAIN_CAMERA, Camera::default());
        scenes.set_camera(SCENE, WIDE_CAMERA, Camera { view_projection: scale(0.5) });
        scenes.set_clear_color(SCENE, [0.02, 0.03, 0.05, 1.0]);

        for &window in ctx.windows {
            ctx.engine.windows().set_scene(window, SCENE, MAIN_CAMERA);
        }

        AppControl::Continue
    }

    fn on_window_event(&mut self, _window: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            match code {
                KeyCode::Escape => return AppControl::Exit,
                KeyCode::KeyN => self.open_wide = true,
                _ => {}
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if std::mem::take(&mut self.open_wide) {
            let id = ctx.runtime.create_window(WindowConfig {
                title: "nabu viewer (wide)".to_string(),
                scene: Some((SCENE, WIDE_CAMERA)),
                ..WindowConfig::default()
            });
            log::info!("{id}: requested");
        }

        self.angle = (self.angle + ctx.time.dt).rem_euclid(std::f32::consts::TAU);

        // Untextured until the checker has landed.
        let mut item = DrawItem::new(self.quad).with_transform(rotate_z(self.angle));
        if self.checker_ready.load(Ordering::Acquire) {
            item = item.with_texture(self.checker);
        }
        ctx.engine.scenes().submit(SCENE, vec![item]);

        AppControl::Continue
    }
}

fn checker(cells: u32, cell_px: u32) -> (u32, u32, Vec<u8>) {
    let size = cells * cell_px;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / cell_px) + (y / cell_px)) % 2 == 0;
            let px: [u8; 4] = if on { [230, 230, 230, 255] } else { [40, 90, 160, 255] };
            pixels.extend_from_slice(&px);
        }
    }
    (size, size, pixels)
}

fn rotate_z(angle: f32) -> [[f32; 4]; 4] {
    let (s, c) = angle.sin_cos();
    [[c, s, 0.0, 0.0], [-s, c, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
}

fn scale(k: f32) -> [[f32; 4]; 4] {
    [[k, 0.0, 0.0, 0.0], [0.0, k, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
}

fn main() -> Result<()> {
    let config = RuntimeConfig {
        window: WindowConfig {
            title: "nabu viewer".to_string(),
            ..WindowConfig::default()
        },
        ..RuntimeConfig::default()
    };

    Runtime::run(config, Viewer::new())
}
