//! Process-wide configuration.
//!
//! Plain structs with `Default`; the host fills what it needs and passes the
//! result to `ProcessContext::new`.

use std::time::Duration;

use crate::logging::LoggingConfig;

/// Render-thread settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Name given to the spawned render thread.
    pub thread_name: String,

    /// Pacing for ticks that present nothing (no windows, or all minimized).
    /// Ticks that present are paced by the surface instead.
    pub idle_frame_interval: Duration,

    /// Clear color for windows without a bound scene.
    pub clear_color: [f32; 4],

    /// Initial slot capacity of the texture table.
    pub texture_capacity: usize,

    /// Initial slot capacity of the mesh table.
    pub mesh_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            thread_name: "nabu-render".to_owned(),
            idle_frame_interval: Duration::from_millis(16),
            clear_color: [0.05, 0.05, 0.07, 1.0],
            texture_capacity: 64,
            mesh_capacity: 64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `Some` installs the global logger when the process context is built.
    pub logging: Option<LoggingConfig>,
    pub render: RenderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logging: Some(LoggingConfig::default()),
            render: RenderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration that leaves the global logger alone.
    pub fn without_logging() -> Self {
        Self {
            logging: None,
            ..Self::default()
        }
    }
}
