//! GPU resource binding: the per-share-group mesh table, the device
//! context and the compiled scene programs.

mod backend;
mod context;
mod headless;
mod mesh;
mod programs;
mod wgpu_backend;

pub use backend::{GpuBackend, GpuMesh, MeshHandle, SharedBackend};
pub use context::{GpuContext, ShareGroup};
pub use headless::HeadlessBackend;
pub use mesh::{MeshData, TextureData, Vertex};
pub use programs::{clear_target, DepthTarget, FrameTarget, ScenePrograms, DEPTH_FORMAT};
pub use wgpu_backend::WgpuBackend;
