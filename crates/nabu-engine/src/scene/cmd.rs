use crate::command::Apply;
use crate::registry::{CameraId, SceneId};
use crate::render::{RenderBackend, RenderState};

use super::{Camera, DrawItem, SceneRenderer};

/// Scene lifecycle and per-frame record.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCmd {
    Create { scene: SceneId },
    Destroy { scene: SceneId },
    Submit { scene: SceneId, draws: Vec<DrawItem> },
    SetCamera { scene: SceneId, camera_id: CameraId, camera: Camera },
    RemoveCamera { scene: SceneId, camera_id: CameraId },
    SetClearColor { scene: SceneId, color: [f32; 4] },
}

impl<B: RenderBackend> Apply<RenderState<B>> for SceneCmd {
    fn apply(self, target: &mut RenderState<B>) {
        match self {
            SceneCmd::Create { scene } => {
                let renderer = SceneRenderer::new(target.default_clear_color());
                // Duplicate keys are reported by the registry.
                let _ = target.scenes.create_new(scene, renderer);
            }

            SceneCmd::Destroy { scene } => {
                if target.scenes.erase(scene).is_none() {
                    log::debug!("scene destroy ignored: {scene} does not exist");
                    return;
                }
                for (window, ctx) in target.windows.iter_mut() {
                    if ctx.binding().is_some_and(|b| b.scene == scene) {
                        log::debug!("{window}: unbound from destroyed {scene}");
                        ctx.unbind();
                    }
                }
            }

            SceneCmd::Submit { scene, draws } => match target.scenes.get_system(scene) {
                Some(renderer) => renderer.submit(draws),
                None => log::warn!("draw list dropped: unknown {scene}"),
            },

            SceneCmd::SetCamera { scene, camera_id, camera } => match target.scenes.get_system(scene) {
                Some(renderer) => renderer.set_camera(camera_id, camera),
                None => log::warn!("{camera_id} dropped: unknown {scene}"),
            },

            SceneCmd::RemoveCamera { scene, camera_id } => match target.scenes.get_system(scene) {
                Some(renderer) => {
                    if renderer.remove_camera(camera_id).is_none() {
                        log::debug!("{scene}: {camera_id} was not set");
                    }
                }
                None => log::warn!("{camera_id} removal dropped: unknown {scene}"),
            },

            SceneCmd::SetClearColor { scene, color } => match target.scenes.get_system(scene) {
                Some(renderer) => renderer.set_clear_color(color),
                None => log::warn!("clear color dropped: unknown {scene}"),
            },
        }
    }
}
