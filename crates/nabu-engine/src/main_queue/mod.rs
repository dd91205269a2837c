//! Render-thread → main-thread callback channel.

mod queue;

pub use queue::{MainThreadQueue, MainThreadTask};
