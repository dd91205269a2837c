use std::sync::Arc;

use crate::context::ProcessContext;
use crate::registry::{SceneId, SystemRegistry, WindowId};
use crate::scene::SceneRenderer;
use crate::window::WindowContext;

use super::{Acquired, BackendError, RenderBackend, ResolvedDraw, SceneFrame};

/// Counters for one pass over all windows.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PassStats {
    pub presented: u32,
    pub skipped: u32,
    pub draws_submitted: u32,
    /// Draws whose mesh or texture handle was stale or not yet uploaded.
    pub draws_dropped: u32,
}

/// Everything the render thread owns.
///
/// Command executors mutate this state; the frame pass reads it. Nothing in
/// here is shared with other threads except through `ProcessContext`.
pub struct RenderState<B: RenderBackend> {
    ctx: ProcessContext<B>,
    pub(crate) backend: B,
    pub(crate) windows: SystemRegistry<WindowId, WindowContext<B>>,
    pub(crate) scenes: SystemRegistry<SceneId, SceneRenderer>,
}

impl<B: RenderBackend> RenderState<B> {
    pub fn new(ctx: ProcessContext<B>, backend: B) -> Self {
        Self {
            ctx,
            backend,
            windows: SystemRegistry::new("window"),
            scenes: SystemRegistry::new("scene"),
        }
    }

    #[inline]
    pub fn context(&self) -> &ProcessContext<B> {
        &self.ctx
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowContext<B>> {
        self.windows.get(id)
    }

    pub fn scene(&self, id: SceneId) -> Option<&SceneRenderer> {
        self.scenes.get(id)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub(crate) fn default_clear_color(&self) -> [f32; 4] {
        self.ctx.config().render.clear_color
    }

    /// Acquires, encodes and presents one frame per window.
    ///
    /// The resource store is locked only while draw handles are resolved,
    /// never while waiting on the surface or encoding. Only fatal backend
    /// errors are returned.
    pub fn render_windows(&mut self) -> Result<PassStats, BackendError> {
        let mut stats = PassStats::default();
        let default_clear = self.default_clear_color();

        for (window_id, window) in self.windows.iter_mut() {
            let mut frame = match self.backend.acquire_frame(window.surface_mut())? {
                Acquired::Frame(frame) => frame,
                Acquired::Skipped | Acquired::Reconfigured => {
                    window.record_skipped();
                    stats.skipped += 1;
                    continue;
                }
            };

            let binding = window.binding();
            let scene = binding.and_then(|b| self.scenes.get(b.scene).map(|s| (b, s)));
            if binding.is_some() && scene.is_none() {
                log::trace!("{window_id}: bound scene is gone; clearing only");
            }

            let live = match scene {
                Some((_, renderer)) => resolve_draws(&self.ctx, renderer, &mut stats.draws_dropped),
                None => Vec::new(),
            };
            let draws: Vec<ResolvedDraw<'_, B>> = live
                .iter()
                .map(|(mesh, texture, transform)| ResolvedDraw::<B> {
                    mesh,
                    texture: texture.as_deref(),
                    transform: *transform,
                })
                .collect();

            let frame_desc = SceneFrame {
                window: window_id,
                size: window.size(),
                scene: scene.map(|(b, _)| b.scene),
                camera: scene.and_then(|(b, s)| s.camera(b.camera).map(|c| (b.camera, c))),
                clear_color: scene.map_or(default_clear, |(_, s)| s.clear_color()),
                draws: &draws,
            };

            self.backend.encode_frame(&mut frame, &frame_desc);
            stats.draws_submitted += draws.len() as u32;

            self.backend.present_frame(window.surface_mut(), frame);
            window.record_presented();
            stats.presented += 1;
        }

        Ok(stats)
    }

    /// Drops every window and scene before the backend goes away.
    pub(crate) fn teardown(&mut self) {
        self.windows.clear();
        self.scenes.clear();
        self.ctx.lock_resources().clear();
    }
}

type LiveDraw<B> = (
    Arc<<B as RenderBackend>::Mesh>,
    Option<Arc<<B as RenderBackend>::Texture>>,
    [[f32; 4]; 4],
);

/// Resolves a scene's draw items under the store lock.
///
/// Items whose mesh or texture is stale or not yet uploaded are counted in
/// `dropped` and left out.
fn resolve_draws<B: RenderBackend>(
    ctx: &ProcessContext<B>,
    renderer: &SceneRenderer,
    dropped: &mut u32,
) -> Vec<LiveDraw<B>> {
    let store = ctx.lock_resources();
    let mut live = Vec::with_capacity(renderer.draws().len());

    for item in renderer.draws() {
        let Some(mesh) = store.mesh(item.mesh) else {
            *dropped += 1;
            continue;
        };
        let texture = if item.texture.is_valid() {
            match store.texture(item.texture) {
                Some(t) => Some(Arc::clone(t)),
                None => {
                    *dropped += 1;
                    continue;
                }
            }
        } else {
            None
        };
        live.push((Arc::clone(mesh), texture, item.transform));
    }

    live
}
