//! Render backends.
//!
//! - `WgpuBackend`: wgpu device, per-window surfaces, built-in textured mesh
//!   pipeline
//! - `HeadlessBackend`: in-memory backend for tests and GPU-less hosts

mod headless;
mod init;
mod mesh_pipeline;
mod surface;
mod wgpu_backend;

pub use headless::{
    HeadlessBackend, HeadlessFrame, HeadlessMesh, HeadlessProbe, HeadlessSurface, HeadlessTexture,
    PresentedDraw, PresentedFrame,
};
pub use init::GpuInit;
pub use mesh_pipeline::MeshVertex;
pub use wgpu_backend::{WgpuBackend, WgpuFrame, WgpuMesh, WgpuSurface, WgpuTexture};
