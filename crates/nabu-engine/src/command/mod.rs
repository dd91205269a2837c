//! Cross-thread command pipeline.
//!
//! Producers (main thread, loaders) append typed records to a `CommandList`.
//! Once per frame the render thread swaps the list's buffers and a
//! `CommandExecutor` applies every drained record to render-thread state.
//!
//! Adding a command category:
//! - define a record enum
//! - implement `Apply<Target>` for it
//! - add a `CommandList` to the process context and an executor to `RenderLoop`

mod executor;
mod list;

pub use executor::{Apply, CommandExecutor, ExecutorState};
pub use list::CommandList;
