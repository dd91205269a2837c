//! GPU resource lifecycle: textures and meshes.
//!
//! Main thread:
//! - `ResourceCommands::create_*` reserves a handle synchronously and queues
//!   the upload with a private copy of the payload
//! - `ResourceCommands::destroy_*` queues the release
//!
//! Render thread:
//! - `ResourceCmd` records are applied by the resource executor, which
//!   populates or frees slots in the shared `ResourceStore`

mod api;
mod cmd;
mod desc;
mod store;

pub use api::ResourceCommands;
pub use cmd::{Completion, LoadError, ResourceCmd};
pub use desc::{MeshDesc, TextureDesc, TextureFormat};
pub use store::{MeshSlot, ResourceState, ResourceStore, TextureSlot};
