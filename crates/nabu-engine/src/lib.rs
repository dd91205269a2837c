//! Nabu engine.
//!
//! Two threads share one `ProcessContext`:
//! - the main thread runs the winit loop and the application, records
//!   commands and runs load-completion callbacks
//! - the render thread owns the backend, drains commands once per tick and
//!   presents every window
//!
//! GPU resources are addressed by generational handles reserved on the
//! producer side, so a handle is usable before its upload has happened and
//! stale once its slot has been reused.

pub mod command;
pub mod config;
pub mod context;
pub mod core;
pub mod device;
pub mod handle;
pub mod logging;
pub mod main_queue;
pub mod registry;
pub mod render;
pub mod resource;
pub mod scene;
pub mod time;
pub mod window;

mod error;

pub use error::EngineError;
