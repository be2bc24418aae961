use std::cell::RefCell;
use std::rc::Rc;

use super::mesh::MeshData;
use crate::error::Result;

/// Opaque key for a mesh allocated by a [`GpuBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub(crate) u64);

impl MeshHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// GPU objects backing one materialized mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Base-color texture, or the share group's 1x1 white fallback
    pub texture_bind_group: wgpu::BindGroup,
    pub textured: bool,
    pub(crate) _texture: Option<wgpu::Texture>,
}

/// Allocator for per-entity GPU resources.
///
/// Implementations are confined to the render thread: they are shared as
/// [`SharedBackend`], which is `!Send`.
pub trait GpuBackend {
    /// Uploads `mesh` and returns a handle to the new buffers.
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle>;

    /// Frees the buffers behind `handle`. Returns false if nothing was freed.
    fn destroy_mesh(&mut self, handle: MeshHandle) -> bool;

    fn contains(&self, handle: MeshHandle) -> bool;

    /// Number of meshes currently allocated.
    fn live_meshes(&self) -> usize;

    /// GPU objects for drawing, if this backend owns real device resources.
    fn resolve(&self, handle: MeshHandle) -> Option<&GpuMesh>;
}

/// Handle table shared by every renderer of one share group.
pub type SharedBackend = Rc<RefCell<dyn GpuBackend>>;
