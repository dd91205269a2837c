//! Per-scene render state and the commands that feed it.
//!
//! Each scene owns a `SceneRenderer` on the render thread, keyed by
//! `SceneId`. The main thread replaces a scene's draw list once per frame
//! with `SceneCommands::submit`; windows pick a scene and camera through
//! `WindowCommands::set_scene`.

mod api;
mod cmd;
mod renderer;

pub use api::SceneCommands;
pub use cmd::SceneCmd;
pub use renderer::{Camera, DrawItem, SceneRenderer, IDENTITY};
