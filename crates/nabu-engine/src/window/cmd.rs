use core::fmt;

use crate::command::Apply;
use crate::registry::{CameraId, SceneId, WindowId};
use crate::render::{RenderBackend, RenderState};

use super::{Extent, WindowContext};

/// Window lifecycle record. `W` is the backend's window target type.
pub enum WindowCmd<W> {
    Create { window: WindowId, target: W, size: Extent },
    Destroy { window: WindowId },
    Resize { window: WindowId, size: Extent },
    SurfaceOutdated { window: WindowId },
    /// `scene == SceneId::NULL` clears the binding.
    SetScene { window: WindowId, scene: SceneId, camera: CameraId },
}

impl<W> fmt::Debug for WindowCmd<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowCmd::Create { window, size, .. } => {
                f.debug_struct("Create").field("window", window).field("size", size).finish()
            }
            WindowCmd::Destroy { window } => f.debug_struct("Destroy").field("window", window).finish(),
            WindowCmd::Resize { window, size } => {
                f.debug_struct("Resize").field("window", window).field("size", size).finish()
            }
            WindowCmd::SurfaceOutdated { window } => {
                f.debug_struct("SurfaceOutdated").field("window", window).finish()
            }
            WindowCmd::SetScene { window, scene, camera } => f
                .debug_struct("SetScene")
                .field("window", window)
                .field("scene", scene)
                .field("camera", camera)
                .finish(),
        }
    }
}

impl<B: RenderBackend> Apply<RenderState<B>> for WindowCmd<B::WindowTarget> {
    fn apply(self, target: &mut RenderState<B>) {
        match self {
            WindowCmd::Create { window, target: window_target, size } => {
                // Check first so a duplicate never builds a second surface.
                if target.windows.contains(window) {
                    log::warn!("window: create rejected, {window} already exists");
                    return;
                }

                match target.backend.create_surface(window, window_target, size) {
                    Ok(surface) => {
                        let _ = target.windows.create_new(window, WindowContext::new(surface, size));
                    }
                    Err(e) => log::error!("{window}: {e}"),
                }
            }

            WindowCmd::Destroy { window } => {
                if target.windows.erase(window).is_none() {
                    log::debug!("window destroy ignored: {window} does not exist");
                }
            }

            WindowCmd::Resize { window, size } => match target.windows.get_system(window) {
                Some(ctx) => {
                    log::debug!("{window}: resized to {size}");
                    ctx.resize(&mut target.backend, size);
                }
                None => log::warn!("resize dropped: unknown {window}"),
            },

            WindowCmd::SurfaceOutdated { window } => match target.windows.get_system(window) {
                Some(ctx) => ctx.reconfigure(&mut target.backend),
                None => log::warn!("surface reconfigure dropped: unknown {window}"),
            },

            WindowCmd::SetScene { window, scene, camera } => {
                if !scene.is_null() && !target.scenes.contains(scene) {
                    log::warn!("set-scene dropped: {window} -> unknown {scene}");
                    return;
                }

                let Some(ctx) = target.windows.get_system(window) else {
                    log::warn!("set-scene dropped: unknown {window}");
                    return;
                };

                if scene.is_null() {
                    ctx.unbind();
                    log::debug!("{window}: scene cleared");
                } else {
                    ctx.bind(scene, camera);
                    log::debug!("{window}: presenting {scene} through {camera}");
                }
            }
        }
    }
}
