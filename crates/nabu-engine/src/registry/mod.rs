//! Keyed ownership of render-thread subsystems.
//!
//! One `SystemRegistry` per subsystem kind: window render contexts keyed by
//! `WindowId`, scene renderers keyed by `SceneId`. Keys are chosen by the
//! caller (the windowing layer, the scene layer), never generated here.

mod ids;
mod system;

pub use ids::{CameraId, RegistryKey, SceneId, WindowId};
pub use system::{RegistryError, SystemRegistry};
