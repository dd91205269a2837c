//! Process context.
//!
//! The one object shared by the main thread and the render thread: the
//! command lists, the resource store, the main-thread queue and the
//! shutdown flag. Cheap to clone.

mod process;

pub use process::ProcessContext;
