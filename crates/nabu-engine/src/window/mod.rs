//! Windows.
//!
//! Main-thread side: the winit runtime and the producer API. Render-thread
//! side: per-window contexts (surface + scene binding) and the commands that
//! create and mutate them.

mod api;
mod cmd;
mod context;
mod extent;
mod runtime;

pub use api::WindowCommands;
pub use cmd::WindowCmd;
pub use context::{SceneBinding, WindowContext};
pub use extent::Extent;
pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx, WindowConfig};
